//! Decoding of streaming completion responses.
//!
//! The backend writes newline-delimited `data: <payload>` frames, where the
//! payload is either a JSON chunk carrying `choices[0].delta.content` or the
//! literal `[DONE]` sentinel. Network reads can split a frame anywhere,
//! including inside a multi-byte UTF-8 character, so bytes are buffered
//! and only complete lines are decoded.
//!
//! - [`drain_data_lines`] -- pull complete `data:` payloads from a byte buffer
//! - [`parse_payload`] -- turn one payload into a [`CompletionEvent`]
//! - [`completion_events`] -- build a lazy event stream from a byte stream

use futures_util::{Stream, StreamExt};

use tc_domain::error::Result;
use tc_domain::stream::{BoxStream, CompletionEvent};

use crate::types::CompletionChunk;

pub const DONE_SENTINEL: &str = "[DONE]";

/// Extract complete `data:` payloads from a byte buffer.
///
/// Lines are terminated by `\n` (a preceding `\r` is dropped). Lines that
/// are blank or carry another field (`event:`, `id:`, `retry:`, comments)
/// are skipped. The buffer is drained in place: consumed bytes are removed
/// and a trailing partial line remains for the next call.
pub(crate) fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut data_lines = Vec::new();

    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        if let Some(data) = data_payload(&line) {
            data_lines.push(data);
        }
    }

    data_lines
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        None
    } else {
        Some(data.to_owned())
    }
}

/// Decode one `data:` payload.
///
/// Returns `None` for well-formed chunks that carry no text (role-only
/// deltas, usage chunks, empty strings).
pub fn parse_payload(data: &str) -> Option<CompletionEvent> {
    if data == DONE_SENTINEL {
        return Some(CompletionEvent::Done);
    }

    let chunk: CompletionChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, payload = %data, "skipping malformed stream frame");
            return Some(CompletionEvent::Malformed {
                payload: data.to_owned(),
            });
        }
    };

    if let Some(err) = chunk.error {
        let message = match err {
            serde_json::Value::String(s) => s,
            other => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_owned)
                .unwrap_or_else(|| other.to_string()),
        };
        return Some(CompletionEvent::ServerError { message });
    }

    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|t| !t.is_empty())?;

    Some(CompletionEvent::Delta { text })
}

/// Build a lazy stream of [`CompletionEvent`]s from a stream of body chunks.
///
/// The stream:
/// 1. Buffers incoming bytes and decodes complete lines only
/// 2. Stops right after the `[DONE]` sentinel, ignoring anything behind it
/// 3. Flushes a trailing unterminated line when the body closes
/// 4. Yields a transport error once and then ends
///
/// It is finite and cannot be restarted.
pub fn completion_events<S, B>(chunks: S) -> BoxStream<'static, Result<CompletionEvent>>
where
    S: Stream<Item = Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut buffer: Vec<u8> = Vec::new();

        'read: loop {
            match chunks.next().await {
                Some(Ok(bytes)) => {
                    buffer.extend_from_slice(bytes.as_ref());
                    for data in drain_data_lines(&mut buffer) {
                        if let Some(event) = parse_payload(&data) {
                            let done = event == CompletionEvent::Done;
                            yield Ok(event);
                            if done {
                                break 'read;
                            }
                        }
                    }
                }
                None => {
                    // Body closed -- flush any remaining partial line.
                    if !buffer.is_empty() {
                        buffer.push(b'\n');
                        for data in drain_data_lines(&mut buffer) {
                            if let Some(event) = parse_payload(&data) {
                                let done = event == CompletionEvent::Done;
                                yield Ok(event);
                                if done {
                                    break 'read;
                                }
                            }
                        }
                    }
                    break;
                }
                Some(Err(e)) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
