//! Application wiring: one owner per slice of state, plus the
//! conversation view that drives a send.

use std::sync::Arc;

use tc_api::{ChatApi, RestChatClient};
use tc_cache::{ChatCache, CredentialStore, JsonFileStore, KeyValueStore, MemoryStore};
use tc_domain::config::Config;
use tc_domain::error::{Error, Result};
use tc_domain::model::ChatMessage;
use tc_domain::notice::{NoticeLevel, Notice, Notifier};
use tc_domain::trace::TraceEvent;

use crate::assembler::{ChatView, CompletionAssembler, CompletionOutcome};
use crate::auth::AuthSession;
use crate::delete::DeleteCoordinator;
use crate::history::HistorySync;
use crate::session::{chat_route, Navigator, SessionId, SessionResolver, PENDING_SESSION};
use crate::speech::SpeechToText;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AppState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Shared application state. Cheap to clone; every slice is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: Arc<dyn ChatApi>,
    pub cache: ChatCache,
    pub credentials: Arc<CredentialStore>,
    pub notifier: Arc<dyn Notifier>,
    pub auth: Arc<AuthSession>,
    pub history: Arc<HistorySync>,
    pub deletes: Arc<DeleteCoordinator>,
    pub speech: Arc<SpeechToText>,
    pub assembler: Arc<CompletionAssembler>,
}

impl AppState {
    /// Build the production stack: storage from `config.storage`, REST
    /// client from `config.api`.
    pub fn connect(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = if config.storage.in_memory {
            Arc::new(MemoryStore::new())
        } else {
            let path = config
                .storage
                .resolved_path()
                .ok_or_else(|| Error::Config("no storage path and no home directory".into()))?;
            Arc::new(JsonFileStore::open(&path)?)
        };
        let credentials = Arc::new(CredentialStore::new(store.clone()));
        let api = Arc::new(RestChatClient::new(
            &config.api,
            credentials.clone(),
            notifier.clone(),
        )?);
        Self::assemble(config, api, store, credentials, notifier)
    }

    /// Wire the components around an existing API client and store.
    pub fn assemble(
        config: Config,
        api: Arc<dyn ChatApi>,
        store: Arc<dyn KeyValueStore>,
        credentials: Arc<CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let cache = ChatCache::new(store);
        let auth = Arc::new(AuthSession::new(api.clone(), credentials.clone())?);
        let history = Arc::new(HistorySync::new(
            api.clone(),
            credentials.clone(),
            cache.clone(),
        ));
        let deletes = Arc::new(DeleteCoordinator::new(
            api.clone(),
            credentials.clone(),
            history.clone(),
            cache.clone(),
            notifier.clone(),
        ));
        let speech = Arc::new(SpeechToText::new(
            api.clone(),
            notifier.clone(),
            config.chat.max_audio_bytes,
        ));
        let assembler = Arc::new(CompletionAssembler::new(
            api.clone(),
            config.chat.model.clone().filter(|m| !m.trim().is_empty()),
        ));

        Ok(Self {
            config: Arc::new(config),
            api,
            cache,
            credentials,
            notifier,
            auth,
            history,
            deletes,
            speech,
            assembler,
        })
    }

    /// Route to open when none is given: the last chat this store was
    /// viewing, else a fresh pending session.
    pub fn resume_route(&self) -> String {
        self.cache
            .current_session()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| PENDING_SESSION.to_owned())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One open chat view: its session identity and its transcript.
pub struct Conversation {
    app: AppState,
    navigator: Arc<dyn Navigator>,
    resolver: SessionResolver,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Open the chat named by `route` (`/chat/<id>`, an id, or `new`).
    ///
    /// A pending session starts empty without any network call. A bound
    /// session is checked against the server: unknown ids fall back to a
    /// pending session; other failures fall back to the cached transcript.
    pub async fn open(app: AppState, route: &str, navigator: Arc<dyn Navigator>) -> Self {
        let id = SessionId::from_route(route);
        let Some(chat_id) = id.as_bound().map(str::to_owned) else {
            return Self::pending(app, navigator);
        };

        match app.api.get_chat(&chat_id).await {
            Err(Error::NotFound(_)) => {
                tracing::info!(chat_id, "chat no longer exists, starting a new one");
                navigator.replace_route(&chat_route(PENDING_SESSION));
                return Self::pending(app, navigator);
            }
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "chat check failed, using cached transcript");
                return Self::from_cache(app, chat_id, navigator);
            }
            Ok(_) => {}
        }

        let messages = match app.api.list_messages(&chat_id).await {
            Ok(records) => records.into_iter().map(|r| r.into_message()).collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "message fetch failed, using cached transcript");
                return Self::from_cache(app, chat_id, navigator);
            }
        };

        app.cache.save_messages(&chat_id, &messages);
        app.cache.set_current_session(&chat_id);
        TraceEvent::SessionOpened {
            session_id: chat_id.clone(),
            messages: messages.len(),
            from_cache: false,
        }
        .emit();

        Self {
            app,
            navigator,
            resolver: SessionResolver::new(SessionId::Bound(chat_id)),
            messages,
        }
    }

    fn pending(app: AppState, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            app,
            navigator,
            resolver: SessionResolver::new(SessionId::Pending),
            messages: Vec::new(),
        }
    }

    fn from_cache(app: AppState, chat_id: String, navigator: Arc<dyn Navigator>) -> Self {
        let messages = app.cache.load_messages(&chat_id).unwrap_or_default();
        TraceEvent::SessionOpened {
            session_id: chat_id.clone(),
            messages: messages.len(),
            from_cache: true,
        }
        .emit();
        Self {
            app,
            navigator,
            resolver: SessionResolver::new(SessionId::Bound(chat_id)),
            messages,
        }
    }

    pub fn session(&self) -> &SessionId {
        self.resolver.id()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send `text` and stream the reply into the transcript.
    ///
    /// Blank input is ignored. If a pending session cannot be created an
    /// alert is raised, nothing is appended and the error is returned.
    /// Every other failure becomes assistant text and the call succeeds.
    pub async fn send(&mut self, text: &str, view: &dyn ChatView) -> Result<CompletionOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("message is empty".into()));
        }

        let session_id = match self
            .resolver
            .ensure_bound(self.app.api.as_ref(), &self.app.cache, self.navigator.as_ref())
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "could not create chat");
                self.app
                    .notifier
                    .alert(&format!("Could not start a new chat: {e}"));
                return Err(e);
            }
        };

        let user_message = ChatMessage::user(text);
        view.message_appended(&user_message);
        self.messages.push(user_message);
        self.app.cache.save_messages(&session_id, &self.messages);

        let outcome = self
            .app
            .assembler
            .run(&session_id, text, &mut self.messages, view)
            .await;
        self.app.cache.save_messages(&session_id, &self.messages);

        if outcome.is_completed() {
            if let Err(e) = self.app.history.refresh().await {
                tracing::warn!(error = %e, "history refresh after send failed");
                self.app.notifier.notify(Notice::new(
                    NoticeLevel::Error,
                    "Could not refresh the chat list",
                ));
            }
        }
        Ok(outcome)
    }
}
