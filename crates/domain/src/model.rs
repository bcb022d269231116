//! Core data model shared by the API client, the cache and the UI layer.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// Cached transcripts written by older builds use `"ai"`.
    #[serde(alias = "ai")]
    Assistant,
}

impl Sender {
    /// Map a server-side sender string. Anything other than `"user"` is
    /// the assistant.
    pub fn from_wire(s: &str) -> Self {
        if s == "user" {
            Sender::User
        } else {
            Sender::Assistant
        }
    }
}

/// One bubble in a conversation. Insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Wall-clock display string (`HH:MM:SS`).
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text.into())
    }

    fn new(sender: Sender, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            sender,
            timestamp: display_time_now(),
        }
    }
}

/// Local time formatted for a message bubble.
pub fn display_time_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat list
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A row in the chat history sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub timestamp_display: String,
    /// `None` for legacy chats created before ownership was recorded.
    #[serde(default)]
    pub owner_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Users
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
}

impl User {
    /// A locally synthesized guest identity. Never sent to the server.
    pub fn guest(now_millis: i64) -> Self {
        Self {
            id: format!("guest-{now_millis}"),
            email: "guest@example.com".into(),
            name: "Guest".into(),
            avatar: None,
            age: None,
            bio: Some("Guest account, some features are limited".into()),
            is_guest: true,
        }
    }
}
