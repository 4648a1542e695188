use parking_lot::Mutex;
use std::sync::Arc;

use crate::api::types::UserProfile;
use crate::errors::WalletResult;
use crate::storage::{KeyValueStore, MemoryStore};

pub const KEY_TOKEN: &str = "token";
pub const KEY_USER: &str = "user";
pub const KEY_USERNAME: &str = "username";
pub const KEY_ETHEREUM_ADDRESS: &str = "ethereum_address";

const SESSION_KEYS: [&str; 4] = [KEY_TOKEN, KEY_USER, KEY_USERNAME, KEY_ETHEREUM_ADDRESS];

/// Authenticated client state: bearer token plus cached profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    /// `None` when the stored profile is missing or unreadable.
    pub user: Option<UserProfile>,
}

/// Owns the persisted session record.
///
/// Writes replace or clear the whole record under one lock, so readers never
/// observe a token without its profile (or the reverse).
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    guard: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Session store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn set_session(&self, token: &str, user: &UserProfile) -> WalletResult<()> {
        let serialized_user = serde_json::to_string(user)?;
        let _lock = self.guard.lock();
        self.store.set_many(&[
            (KEY_TOKEN, token),
            (KEY_USER, serialized_user.as_str()),
            (KEY_USERNAME, user.username.as_str()),
            (KEY_ETHEREUM_ADDRESS, user.ethereum_address.as_str()),
        ])?;
        tracing::debug!(username = %user.username, "session stored");
        Ok(())
    }

    pub fn session(&self) -> Option<Session> {
        let _lock = self.guard.lock();
        let token = self.read_key(KEY_TOKEN)?;
        Some(Session {
            token,
            user: self.read_user(),
        })
    }

    pub fn clear_session(&self) -> WalletResult<()> {
        let _lock = self.guard.lock();
        self.store.remove_many(&SESSION_KEYS)?;
        tracing::debug!("session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn token(&self) -> Option<String> {
        let _lock = self.guard.lock();
        self.read_key(KEY_TOKEN)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        let _lock = self.guard.lock();
        self.read_key(KEY_TOKEN)?;
        self.read_user()
    }

    pub fn username(&self) -> Option<String> {
        let _lock = self.guard.lock();
        self.read_key(KEY_USERNAME)
    }

    pub fn ethereum_address(&self) -> Option<String> {
        let _lock = self.guard.lock();
        self.read_key(KEY_ETHEREUM_ADDRESS)
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read session key");
                None
            }
        }
    }

    fn read_user(&self) -> Option<UserProfile> {
        let raw = self.read_key(KEY_USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "stored user profile is unreadable");
                None
            }
        }
    }
}
