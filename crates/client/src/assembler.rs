//! Reduces a completion stream into one growing assistant message.
//!
//! The assembler owns no state between calls: each [`CompletionAssembler::run`]
//! appends to the transcript it is handed and reports how the stream ended.

use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;

use tc_api::{ChatApi, CompletionRequest};
use tc_domain::error::Error;
use tc_domain::model::ChatMessage;
use tc_domain::stream::CompletionEvent;
use tc_domain::trace::TraceEvent;

/// Observer for transcript changes; the front end renders from these.
pub trait ChatView: Send + Sync {
    fn message_appended(&self, _message: &ChatMessage) {}

    /// The text of an already appended message changed.
    fn message_updated(&self, _message: &ChatMessage) {}
}

/// A view that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoView;

impl ChatView for NoView {}

/// How a completion ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Sentinel or end of body reached without an error.
    Completed,
    /// The request was rejected before any stream opened.
    Rejected(String),
    /// The stream opened and then failed.
    Interrupted(String),
}

impl CompletionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CompletionOutcome::Completed)
    }

    fn label(&self) -> &'static str {
        match self {
            CompletionOutcome::Completed => "completed",
            CompletionOutcome::Rejected(_) => "rejected",
            CompletionOutcome::Interrupted(_) => "interrupted",
        }
    }
}

/// Text shown in place of a reply when the completion fails.
pub fn failure_text(reason: &str) -> String {
    if reason.contains("Insufficient Balance") {
        return "Sorry, the assistant is temporarily unavailable: the service account may be \
                out of balance. Please contact the administrator."
            .to_owned();
    }
    format!("Sorry, I can't reply right now. Error: {reason}")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assembler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct CompletionAssembler {
    api: Arc<dyn ChatApi>,
    model: Option<String>,
}

#[derive(Default)]
struct Tally {
    deltas: usize,
    malformed: usize,
}

impl CompletionAssembler {
    pub fn new(api: Arc<dyn ChatApi>, model: Option<String>) -> Self {
        Self { api, model }
    }

    /// Request a reply to `text` in `session_id` and stream it into
    /// `messages`.
    ///
    /// The user message must already be in `messages`. Every failure ends
    /// up as visible assistant text; nothing is returned as `Err`.
    pub async fn run(
        &self,
        session_id: &str,
        text: &str,
        messages: &mut Vec<ChatMessage>,
        view: &dyn ChatView,
    ) -> CompletionOutcome {
        let start = Instant::now();
        let req = CompletionRequest::user_turn(text, self.model.clone());
        let mut tally = Tally::default();

        let outcome = match self.api.stream_completion(session_id, req).await {
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(session_id, error = %reason, "completion request failed");
                let reply = ChatMessage::assistant(failure_text(&reason));
                view.message_appended(&reply);
                messages.push(reply);
                CompletionOutcome::Rejected(reason)
            }
            Ok(mut events) => {
                let placeholder = ChatMessage::assistant("");
                view.message_appended(&placeholder);
                messages.push(placeholder);
                let slot = messages.len() - 1;

                let mut acc = String::new();
                let mut failure: Option<String> = None;

                while let Some(event) = events.next().await {
                    match event {
                        Ok(CompletionEvent::Delta { text }) => {
                            tally.deltas += 1;
                            acc.push_str(&text);
                            messages[slot].text.clone_from(&acc);
                            view.message_updated(&messages[slot]);
                        }
                        Ok(CompletionEvent::Malformed { .. }) => tally.malformed += 1,
                        Ok(CompletionEvent::ServerError { message }) => {
                            failure = Some(message);
                            break;
                        }
                        Ok(CompletionEvent::Done) => break,
                        Err(e) => {
                            failure = Some(stream_error_reason(&e));
                            break;
                        }
                    }
                }

                match failure {
                    None => CompletionOutcome::Completed,
                    Some(reason) => {
                        tracing::warn!(session_id, error = %reason, "completion stream failed");
                        let text = failure_text(&reason);
                        if messages[slot].text.is_empty() {
                            messages[slot].text = text;
                            view.message_updated(&messages[slot]);
                        } else {
                            let reply = ChatMessage::assistant(text);
                            view.message_appended(&reply);
                            messages.push(reply);
                        }
                        CompletionOutcome::Interrupted(reason)
                    }
                }
            }
        };

        let chars = messages
            .last()
            .map(|m| m.text.chars().count())
            .unwrap_or_default();
        TraceEvent::CompletionFinished {
            session_id: session_id.to_owned(),
            outcome: outcome.label().to_owned(),
            deltas: tally.deltas,
            malformed_frames: tally.malformed,
            chars,
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        outcome
    }
}

fn stream_error_reason(e: &Error) -> String {
    match e {
        Error::Timeout(_) => "the reply took too long".to_owned(),
        other => other.to_string(),
    }
}
