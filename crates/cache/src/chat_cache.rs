//! Typed view over the key-value store for chat transcripts and the chat
//! list.
//!
//! Every write is best effort: a failure is logged and swallowed because
//! the server copy is authoritative. Reads that fail to decode behave as
//! a cache miss.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use tc_domain::model::{ChatMessage, ChatSummary};

use crate::store::KeyValueStore;

pub const HISTORY_KEY: &str = "chatHistory";
pub const CURRENT_SESSION_KEY: &str = "currentSessionId";

/// Storage key holding the transcript of one conversation.
pub fn transcript_key(session_id: &str) -> String {
    format!("chat_{session_id}")
}

#[derive(Clone)]
pub struct ChatCache {
    store: Arc<dyn KeyValueStore>,
}

impl ChatCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // ── transcripts ──────────────────────────────────────────────────

    pub fn load_messages(&self, session_id: &str) -> Option<Vec<ChatMessage>> {
        self.read_json(&transcript_key(session_id))
    }

    /// Overwrite the cached transcript. Empty transcripts are not written.
    pub fn save_messages(&self, session_id: &str, messages: &[ChatMessage]) {
        if messages.is_empty() {
            return;
        }
        self.write_json(&transcript_key(session_id), &messages);
    }

    pub fn forget_messages(&self, session_id: &str) {
        if let Err(e) = self.store.remove(&transcript_key(session_id)) {
            tracing::warn!(session_id, error = %e, "failed to drop cached transcript");
        }
    }

    // ── chat list ────────────────────────────────────────────────────

    pub fn load_history(&self) -> Option<Vec<ChatSummary>> {
        self.read_json(HISTORY_KEY)
    }

    pub fn save_history(&self, chats: &[ChatSummary]) {
        self.write_json(HISTORY_KEY, &chats);
    }

    // ── current session ──────────────────────────────────────────────

    pub fn current_session(&self) -> Option<String> {
        self.store.get(CURRENT_SESSION_KEY)
    }

    pub fn set_current_session(&self, session_id: &str) {
        if let Err(e) = self.store.set(CURRENT_SESSION_KEY, session_id.to_owned()) {
            tracing::warn!(session_id, error = %e, "failed to cache current session id");
        }
    }

    // ── helpers ──────────────────────────────────────────────────────

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring undecodable cache entry");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set(key, json) {
            tracing::warn!(key, error = %e, "failed to write cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache() -> ChatCache {
        ChatCache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn transcript_roundtrip_uses_per_session_key() {
        let cache = cache();
        let messages = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello!")];
        cache.save_messages("abc", &messages);

        assert!(cache.store().get("chat_abc").is_some());
        assert_eq!(cache.load_messages("abc").unwrap(), messages);
        assert!(cache.load_messages("other").is_none());
    }

    #[test]
    fn empty_transcript_is_not_written() {
        let cache = cache();
        cache.save_messages("abc", &[]);
        assert!(cache.store().get("chat_abc").is_none());
    }

    #[test]
    fn garbage_entry_reads_as_miss() {
        let cache = cache();
        cache.store().set("chatHistory", "[{oops".into()).unwrap();
        assert!(cache.load_history().is_none());
    }

    #[test]
    fn history_is_overwritten() {
        let cache = cache();
        let first = vec![ChatSummary {
            id: "1".into(),
            title: "Kyoto in autumn".into(),
            last_message: String::new(),
            timestamp_display: String::new(),
            owner_id: Some("u1".into()),
        }];
        cache.save_history(&first);
        cache.save_history(&[]);
        assert_eq!(cache.load_history().unwrap(), Vec::<ChatSummary>::new());
    }

    #[test]
    fn current_session_roundtrip() {
        let cache = cache();
        assert!(cache.current_session().is_none());
        cache.set_current_session("s-1");
        assert_eq!(cache.current_session().as_deref(), Some("s-1"));
    }
}
