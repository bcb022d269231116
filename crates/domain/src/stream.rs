use serde::Serialize;
use std::pin::Pin;

/// A boxed async stream, used for streaming completion responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Events decoded from a streaming completion response.
///
/// The sequence is finite and ends with at most one `Done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CompletionEvent {
    /// An incremental piece of assistant text.
    #[serde(rename = "delta")]
    Delta { text: String },

    /// The server reported a failure inside the stream (`{"error": ...}`).
    #[serde(rename = "server_error")]
    ServerError { message: String },

    /// A `data:` frame that could not be decoded; carries the raw payload.
    #[serde(rename = "malformed")]
    Malformed { payload: String },

    /// The `[DONE]` sentinel was seen.
    #[serde(rename = "done")]
    Done,
}
