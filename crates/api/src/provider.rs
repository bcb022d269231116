//! The `ChatApi` trait defines the remote surface the client consumes
//! (REST implementation, test doubles).

use async_trait::async_trait;

use tc_domain::error::Result;
use tc_domain::stream::{BoxStream, CompletionEvent};

use crate::types::{
    AudioUpload, AuthResponse, ChatRecord, CompletionRequest, CreateChatRequest, MessageRecord,
    SignInRequest, SignUpRequest,
};

/// Abstraction over the TripChat backend API.
///
/// Authenticated calls carry the current bearer token. A 401 on any of
/// them clears the stored credentials and returns
/// [`Error::SessionExpired`](tc_domain::error::Error::SessionExpired).
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// List the caller's chats (GET /chats/).
    async fn list_chats(&self) -> Result<Vec<ChatRecord>>;

    /// Create an empty chat (POST /chats/).
    async fn create_chat(&self, req: CreateChatRequest) -> Result<ChatRecord>;

    /// Fetch one chat; `Error::NotFound` when it does not exist (GET /chats/{id}).
    async fn get_chat(&self, chat_id: &str) -> Result<ChatRecord>;

    /// Stored messages of a chat in display order (GET /chats/{id}/messages).
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<MessageRecord>>;

    /// Start a streaming completion (POST /chats/{id}/completions).
    ///
    /// Returns once the response head has arrived; a non-success status is
    /// an error here, before any event is produced.
    async fn stream_completion(
        &self,
        chat_id: &str,
        req: CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>>;

    /// Permanently delete a chat (DELETE /chats/{id}).
    async fn delete_chat(&self, chat_id: &str) -> Result<()>;

    /// Exchange credentials for a token (POST /auth/signin).
    async fn sign_in(&self, req: SignInRequest) -> Result<AuthResponse>;

    /// Register a new account (POST /auth/signup).
    async fn sign_up(&self, req: SignUpRequest) -> Result<AuthResponse>;

    /// Transcribe an audio recording (POST /speech/speech-to-text).
    async fn speech_to_text(&self, audio: AudioUpload) -> Result<String>;
}
