//! Session identity: which conversation the front end is showing.
//!
//! A route either names a server-issued chat id or the placeholder
//! [`PENDING_SESSION`]. A pending session gets its server record lazily,
//! on the first outgoing message.

use std::fmt;

use tc_api::{ChatApi, CreateChatRequest};
use tc_cache::ChatCache;
use tc_domain::error::{Error, Result};
use tc_domain::trace::TraceEvent;

/// Route value meaning "no server-side chat yet".
pub const PENDING_SESSION: &str = "new";

/// Route of a chat view.
pub fn chat_route(session_id: &str) -> String {
    format!("/chat/{session_id}")
}

/// Rewrites the visible route without navigating or reloading.
pub trait Navigator: Send + Sync {
    fn replace_route(&self, route: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionId {
    Pending,
    Bound(String),
}

impl SessionId {
    /// Accepts `/chat/<id>`, a bare id, or the placeholder. Empty input is
    /// treated as pending.
    pub fn from_route(route: &str) -> Self {
        let id = route
            .trim()
            .trim_start_matches("/chat/")
            .trim_matches('/');
        if id.is_empty() || id == PENDING_SESSION {
            SessionId::Pending
        } else {
            SessionId::Bound(id.to_owned())
        }
    }

    pub fn as_bound(&self) -> Option<&str> {
        match self {
            SessionId::Bound(id) => Some(id),
            SessionId::Pending => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SessionId::Pending)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionId::Pending => f.write_str(PENDING_SESSION),
            SessionId::Bound(id) => f.write_str(id),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owns the session id of one conversation view.
///
/// `Pending → Bound` happens at most once per resolver; a bound resolver
/// never goes back to pending.
#[derive(Debug)]
pub struct SessionResolver {
    id: SessionId,
}

impl SessionResolver {
    pub fn new(id: SessionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Return the bound id, creating the server-side chat first when the
    /// session is still pending.
    ///
    /// On failure the resolver stays pending and nothing is written.
    pub async fn ensure_bound(
        &mut self,
        api: &dyn ChatApi,
        cache: &ChatCache,
        navigator: &dyn Navigator,
    ) -> Result<String> {
        if let SessionId::Bound(id) = &self.id {
            return Ok(id.clone());
        }

        let chat = api.create_chat(CreateChatRequest::default()).await?;
        if chat.id.is_empty() || chat.id == PENDING_SESSION {
            return Err(Error::Other(format!(
                "server issued an unusable chat id {:?}",
                chat.id
            )));
        }

        navigator.replace_route(&chat_route(&chat.id));
        cache.set_current_session(&chat.id);
        TraceEvent::SessionBound {
            session_id: chat.id.clone(),
        }
        .emit();

        self.id = SessionId::Bound(chat.id.clone());
        Ok(chat.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_parsing() {
        assert_eq!(SessionId::from_route("new"), SessionId::Pending);
        assert_eq!(SessionId::from_route("/chat/new"), SessionId::Pending);
        assert_eq!(SessionId::from_route(""), SessionId::Pending);
        assert_eq!(
            SessionId::from_route("/chat/abc-123"),
            SessionId::Bound("abc-123".into())
        );
        assert_eq!(
            SessionId::from_route("abc-123"),
            SessionId::Bound("abc-123".into())
        );
    }

    #[test]
    fn display_uses_placeholder() {
        assert_eq!(SessionId::Pending.to_string(), "new");
        assert_eq!(SessionId::Bound("x".into()).to_string(), "x");
        assert_eq!(chat_route("x"), "/chat/x");
    }
}
