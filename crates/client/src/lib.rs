//! `tc-client`: TripChat client state machines.
//!
//! Wires the API client and the local cache into the components a front
//! end drives: session identity, streaming reply assembly, authentication,
//! chat history, delete confirmation and voice input. [`AppState`] owns
//! them; [`Conversation`] is one open chat.

pub mod app;
pub mod assembler;
pub mod auth;
pub mod delete;
pub mod history;
pub mod session;
pub mod speech;

pub use app::{AppState, Conversation};
pub use assembler::{ChatView, CompletionOutcome, NoView};
pub use auth::{AuthPhase, AuthSession, Registration};
pub use delete::{DeleteCoordinator, DeleteIntent, DeleteOutcome, DELETE_NOTICE};
pub use history::{visible_chats, HistorySync};
pub use session::{chat_route, Navigator, SessionId, PENDING_SESSION};
pub use speech::SpeechToText;
