//! Data Transfer Objects matching the TripChat backend schema.
//!
//! Wire names are `snake_case`. Server records are decoded here and
//! mapped into the view model (`tc_domain::model`) before they travel any
//! further inward.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use tc_domain::model::{ChatMessage, ChatSummary, Sender, User};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chats
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const UNTITLED_CHAT: &str = "New chat";

/// POST /chats/: request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A chat as returned by `GET /chats/`, `POST /chats/` and `GET /chats/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Missing or `null` on legacy chats.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
}

impl ChatRecord {
    /// Map into the sidebar view model.
    pub fn into_summary(self) -> ChatSummary {
        let when = self
            .updated_at
            .as_deref()
            .or(self.created_at.as_deref())
            .and_then(parse_server_time)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        ChatSummary {
            id: self.id,
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_CHAT.to_owned()),
            last_message: self.last_message.unwrap_or_default(),
            timestamp_display: when,
            owner_id: self.user_id.filter(|u| !u.is_empty()),
        }
    }
}

/// GET /chats/: response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatRecord>,
}

/// One stored message from `GET /chats/{id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub content: String,
    /// `"user"` or `"ai"`.
    pub sender: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl MessageRecord {
    pub fn into_message(self) -> ChatMessage {
        let timestamp = self
            .created_at
            .as_deref()
            .or(self.timestamp.as_deref())
            .and_then(parse_server_time)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();

        ChatMessage {
            id: self.id,
            text: self.content,
            sender: Sender::from_wire(&self.sender),
            timestamp,
        }
    }
}

/// GET /chats/{id}/messages: response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageRecord>,
}

/// Parse a server timestamp. Accepts RFC 3339 and the naive ISO form the
/// backend emits for timezone-less columns.
pub fn parse_server_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

/// POST /chats/{id}/completions: request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<CompletionMessage>,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionRequest {
    /// A streaming request carrying a single user turn. The server keeps
    /// the conversation context itself.
    pub fn user_turn(text: impl Into<String>, model: Option<String>) -> Self {
        Self {
            messages: vec![CompletionMessage {
                role: "user".into(),
                content: text.into(),
            }],
            stream: true,
            model,
        }
    }
}

/// One `data:` frame of a streaming completion.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// In-band failure reported by the backend after the stream started.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Auth
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /auth/signin: request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/signup: request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub username: String,
}

/// User record as the backend serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
}

impl UserRecord {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            avatar: self.avatar_url,
            age: self.age,
            bio: self.bio,
            is_guest: self.is_guest,
        }
    }
}

/// Sign-in / sign-up success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserRecord,
    pub token: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Speech
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An audio recording to transcribe.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

/// POST /speech/speech-to-text: response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechResponse {
    pub success: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
