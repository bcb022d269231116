//! Single-slot confirmation dialog guarding chat deletion.

use std::sync::Arc;

use parking_lot::Mutex;

use tc_api::ChatApi;
use tc_cache::{ChatCache, CredentialStore};
use tc_domain::notice::{Notice, NoticeLevel, Notifier};
use tc_domain::trace::TraceEvent;

use crate::history::HistorySync;

/// Key shared by every notice of one delete, so they replace each other.
pub const DELETE_NOTICE: &str = "delete-chat";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteIntent {
    pub is_open: bool,
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Confirm pressed with nothing selected.
    NoTarget,
    NotSignedIn,
    Deleted(String),
    Failed { chat_id: String, message: String },
}

pub struct DeleteCoordinator {
    api: Arc<dyn ChatApi>,
    credentials: Arc<CredentialStore>,
    history: Arc<HistorySync>,
    cache: ChatCache,
    notifier: Arc<dyn Notifier>,
    intent: Mutex<DeleteIntent>,
}

impl DeleteCoordinator {
    pub fn new(
        api: Arc<dyn ChatApi>,
        credentials: Arc<CredentialStore>,
        history: Arc<HistorySync>,
        cache: ChatCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            credentials,
            history,
            cache,
            notifier,
            intent: Mutex::new(DeleteIntent::default()),
        }
    }

    pub fn intent(&self) -> DeleteIntent {
        self.intent.lock().clone()
    }

    /// Show the dialog for `chat_id`, replacing any previous target.
    pub fn open(&self, chat_id: &str) {
        *self.intent.lock() = DeleteIntent {
            is_open: true,
            target_id: Some(chat_id.to_owned()),
        };
    }

    pub fn cancel(&self) {
        self.close();
    }

    /// Delete the target. The dialog is closed on every outcome.
    pub async fn confirm(&self) -> DeleteOutcome {
        let target = self.intent.lock().target_id.clone();
        let outcome = match target {
            None => DeleteOutcome::NoTarget,
            Some(chat_id) => self.delete(chat_id).await,
        };
        self.close();
        outcome
    }

    async fn delete(&self, chat_id: String) -> DeleteOutcome {
        if self.credentials.token().is_none() {
            self.notifier.notify(Notice::new(
                NoticeLevel::Error,
                "You are not signed in, the chat cannot be deleted",
            ));
            return DeleteOutcome::NotSignedIn;
        }

        self.notifier.notify(Notice::keyed(
            DELETE_NOTICE,
            NoticeLevel::Loading,
            "Deleting chat...",
        ));

        let result = self.api.delete_chat(&chat_id).await;
        TraceEvent::ChatDeleted {
            chat_id: chat_id.clone(),
            ok: result.is_ok(),
        }
        .emit();

        match result {
            Ok(()) => {
                self.history.remove(&chat_id);
                self.cache.forget_messages(&chat_id);
                self.notifier.notify(Notice::keyed(
                    DELETE_NOTICE,
                    NoticeLevel::Success,
                    "Chat permanently deleted",
                ));
                DeleteOutcome::Deleted(chat_id)
            }
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "chat delete failed");
                self.notifier.notify(Notice::keyed(
                    DELETE_NOTICE,
                    NoticeLevel::Error,
                    "Delete failed, please try again later",
                ));
                DeleteOutcome::Failed {
                    chat_id,
                    message: e.to_string(),
                }
            }
        }
    }

    fn close(&self) {
        *self.intent.lock() = DeleteIntent::default();
    }
}
