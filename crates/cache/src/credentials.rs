//! Bearer token + user record, persisted and cleared as a pair.
//!
//! The store never holds a token without a user or a user without a
//! token. A guest identity lives only in memory and carries no token.

use std::sync::Arc;

use parking_lot::RwLock;

use tc_domain::error::{Error, Result};
use tc_domain::model::User;

use crate::store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    guest: RwLock<Option<User>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            guest: RwLock::new(None),
        }
    }

    /// Load the persisted identity. Any inconsistent state (token without
    /// user, user without token, undecodable user) is wiped.
    pub fn restore(&self) -> Option<User> {
        let token = self.store.get(TOKEN_KEY);
        let raw_user = self.store.get(USER_KEY);

        match (token, raw_user) {
            (Some(_), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "stored user record is corrupt, signing out");
                    self.clear();
                    None
                }
            },
            (None, None) => None,
            _ => {
                tracing::warn!("token and user record out of sync, signing out");
                self.clear();
                None
            }
        }
    }

    /// The bearer token, if a signed-in (non-guest) user exists.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// The current identity: the persisted user, else the guest.
    pub fn user(&self) -> Option<User> {
        if self.token().is_some() {
            if let Some(user) = self
                .store
                .get(USER_KEY)
                .and_then(|raw| serde_json::from_str::<User>(&raw).ok())
            {
                return Some(user);
            }
        }
        self.guest.read().clone()
    }

    /// Persist a signed-in identity. Replaces any guest.
    pub fn save(&self, token: &str, user: &User) -> Result<()> {
        if token.is_empty() {
            return Err(Error::Validation("refusing to store an empty token".into()));
        }
        let json = serde_json::to_string(user)?;
        self.store.set(USER_KEY, json)?;
        if let Err(e) = self.store.set(TOKEN_KEY, token.to_owned()) {
            // Keep the pair consistent: no user without its token.
            let _ = self.store.remove(USER_KEY);
            return Err(e);
        }
        *self.guest.write() = None;
        Ok(())
    }

    /// Switch to a local guest identity. Drops any persisted credentials.
    pub fn set_guest(&self, user: User) {
        self.clear_persisted();
        *self.guest.write() = Some(user);
    }

    /// Forget everything: token, user record and guest.
    pub fn clear(&self) {
        self.clear_persisted();
        *self.guest.write() = None;
    }

    fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear credential");
            }
        }
    }
}
