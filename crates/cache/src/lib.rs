//! Client-side cache for TripChat.
//!
//! Everything here models browser local storage: a flat string key-value
//! store ([`KeyValueStore`]) with typed views on top of it. The cache is
//! never the record of truth; the remote API is.
//!
//! - [`ChatCache`] mirrors conversation transcripts (`chat_<id>`), the chat
//!   list (`chatHistory`) and the current session id (`currentSessionId`).
//! - [`CredentialStore`] owns the bearer token (`token`) and the signed-in
//!   user record (`user`), and keeps them consistent with each other.

pub mod chat_cache;
pub mod credentials;
pub mod store;

pub use chat_cache::ChatCache;
pub use credentials::CredentialStore;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
