//! `tc-api`: client for the TripChat backend HTTP API.
//!
//! Provides the [`ChatApi`] trait that abstracts over the backend, a
//! production REST implementation ([`RestChatClient`]), typed DTOs for
//! every endpoint, and the decoder that turns a streaming completion
//! body into [`CompletionEvent`](tc_domain::stream::CompletionEvent)s.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures_util::StreamExt;
//! use tc_api::{ChatApi, CompletionRequest, CreateChatRequest, RestChatClient};
//! use tc_cache::{CredentialStore, MemoryStore};
//! use tc_domain::config::ApiConfig;
//! use tc_domain::notice::LogNotifier;
//!
//! # async fn example() -> tc_domain::error::Result<()> {
//! let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryStore::new())));
//! let client = RestChatClient::new(&ApiConfig::default(), credentials, Arc::new(LogNotifier))?;
//!
//! let chat = client.create_chat(CreateChatRequest::default()).await?;
//! let mut events = client
//!     .stream_completion(&chat.id, CompletionRequest::user_turn("Two days in Porto?", None))
//!     .await?;
//! while let Some(event) = events.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error_body;
pub mod provider;
pub mod rest;
pub mod sse;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use provider::ChatApi;
pub use rest::{from_reqwest, RestChatClient, SESSION_EXPIRED_NOTICE};
pub use types::{
    AudioUpload, AuthResponse, ChatRecord, CompletionRequest, CreateChatRequest, MessageRecord,
    SignInRequest, SignUpRequest, UserRecord,
};
