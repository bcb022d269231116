//! Sidebar chat list, fetched from the server and filtered by identity.

use std::sync::Arc;

use parking_lot::RwLock;

use tc_api::ChatApi;
use tc_cache::{ChatCache, CredentialStore};
use tc_domain::error::Result;
use tc_domain::model::{ChatSummary, User};
use tc_domain::trace::TraceEvent;

/// Chats a viewer may see: a signed-in user sees their own chats plus
/// ownerless legacy chats; guests and anonymous viewers see only the
/// ownerless ones.
pub fn visible_chats(chats: Vec<ChatSummary>, viewer: Option<&User>) -> Vec<ChatSummary> {
    let owner = viewer.filter(|u| !u.is_guest).map(|u| u.id.as_str());
    chats
        .into_iter()
        .filter(|c| match (c.owner_id.as_deref(), owner) {
            (None, _) => true,
            (Some(chat_owner), Some(me)) => chat_owner == me,
            (Some(_), None) => false,
        })
        .collect()
}

pub struct HistorySync {
    api: Arc<dyn ChatApi>,
    credentials: Arc<CredentialStore>,
    cache: ChatCache,
    chats: RwLock<Vec<ChatSummary>>,
    /// Identity the current list was fetched for.
    synced_for: RwLock<Option<Option<String>>>,
}

impl HistorySync {
    pub fn new(api: Arc<dyn ChatApi>, credentials: Arc<CredentialStore>, cache: ChatCache) -> Self {
        Self {
            api,
            credentials,
            cache,
            chats: RwLock::new(Vec::new()),
            synced_for: RwLock::new(None),
        }
    }

    /// Snapshot of the visible list.
    pub fn chats(&self) -> Vec<ChatSummary> {
        self.chats.read().clone()
    }

    /// Refetch the list for the current identity.
    ///
    /// Without a token the list is emptied and nothing is sent. On failure
    /// the current list stays (seeded from the cache when empty), the error
    /// is returned, and the list counts as unsynced.
    pub async fn refresh(&self) -> Result<()> {
        let viewer = self.credentials.user();
        let viewer_id = viewer.as_ref().map(|u| u.id.clone());

        if self.credentials.token().is_none() {
            self.chats.write().clear();
            *self.synced_for.write() = Some(viewer_id.clone());
            TraceEvent::HistorySynced {
                viewer: viewer_id,
                total: 0,
                visible: 0,
            }
            .emit();
            return Ok(());
        }

        match self.api.list_chats().await {
            Ok(records) => {
                let total = records.len();
                let summaries = records.into_iter().map(|r| r.into_summary()).collect();
                let visible = visible_chats(summaries, viewer.as_ref());
                self.cache.save_history(&visible);
                TraceEvent::HistorySynced {
                    viewer: viewer_id.clone(),
                    total,
                    visible: visible.len(),
                }
                .emit();
                *self.chats.write() = visible;
                *self.synced_for.write() = Some(viewer_id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat list fetch failed");
                // Unsynced, so the next identity check fetches again.
                *self.synced_for.write() = None;
                let mut chats = self.chats.write();
                if chats.is_empty() {
                    if let Some(cached) = self.cache.load_history() {
                        *chats = visible_chats(cached, viewer.as_ref());
                    }
                }
                Err(e)
            }
        }
    }

    /// Refresh only if the identity changed since the last fetch.
    /// Returns whether a refresh ran.
    pub async fn sync_identity(&self) -> Result<bool> {
        let current = self.credentials.user().map(|u| u.id);
        let unchanged = self.synced_for.read().as_ref() == Some(&current);
        if unchanged {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Drop a chat from the list and the cached history.
    pub fn remove(&self, chat_id: &str) {
        let mut chats = self.chats.write();
        chats.retain(|c| c.id != chat_id);
        self.cache.save_history(&chats);
    }
}
