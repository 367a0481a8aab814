//! Identity persistence.
//!
//! The in-memory [`Identity`] backed by the durable [`KeyValueStore`] is the
//! source of truth. The [`AuthCookie`] is a derived mirror of the durable
//! token, kept only so the server can read it; it is written whenever the
//! token is and only read as a fallback when the durable entry is missing.

mod cookie;
mod store;

use std::sync::{PoisonError, RwLock};

pub use cookie::{AuthCookie, AUTH_COOKIE};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::error::StorageError;
use crate::models::User;

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

pub struct SessionStorage {
    identity: RwLock<Identity>,
    durable: Box<dyn KeyValueStore>,
    cookie: AuthCookie,
}

impl SessionStorage {
    /// The cookie jar only lives in memory, so it is rebuilt from the durable
    /// token as soon as storage is opened.
    pub fn new(durable: Box<dyn KeyValueStore>, cookie: AuthCookie) -> Self {
        let storage = Self {
            identity: RwLock::new(Identity::default()),
            durable,
            cookie,
        };
        storage.sync_cookie();
        storage
    }

    pub fn identity(&self) -> Identity {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cookie(&self) -> &AuthCookie {
        &self.cookie
    }

    /// The user last written to durable storage, if it still parses.
    pub fn cached_user(&self) -> Option<User> {
        let raw = self.durable.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Ignoring unreadable cached user: {}", e);
                None
            }
        }
    }

    /// The stored token, durable entry first and the cookie second.
    pub fn cached_token(&self) -> Option<String> {
        self.durable.get(TOKEN_KEY).or_else(|| self.cookie.get())
    }

    /// Like [`cached_token`](Self::cached_token), but a token found only in
    /// the cookie is written back to durable storage.
    pub fn resolve_token(&self) -> Option<String> {
        if let Some(token) = self.durable.get(TOKEN_KEY) {
            return Some(token);
        }
        let token = self.cookie.get()?;
        if let Err(e) = self.durable.set(TOKEN_KEY, &token) {
            log::warn!("Failed to backfill token from cookie: {}", e);
        }
        Some(token)
    }

    /// Records a freshly issued identity everywhere.
    pub fn establish(&self, user: User, token: String) -> Result<(), StorageError> {
        self.durable.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.durable.set(TOKEN_KEY, &token)?;
        self.adopt(user, token);
        Ok(())
    }

    /// Writes the durable token into the cookie. Returns whether one was found.
    pub fn sync_cookie(&self) -> bool {
        match self.durable.get(TOKEN_KEY) {
            Some(token) => {
                self.cookie.set(&token);
                true
            }
            None => false,
        }
    }

    /// Makes an already persisted identity current without rewriting durable
    /// storage. The cookie is refreshed to match.
    pub fn adopt(&self, user: User, token: String) {
        self.cookie.set(&token);
        let mut identity = self.identity.write().unwrap_or_else(PoisonError::into_inner);
        identity.user = Some(user);
        identity.token = Some(token);
    }

    pub fn cache_user(&self, user: &User) -> Result<(), StorageError> {
        self.durable.set(USER_KEY, &serde_json::to_string(user)?)
    }

    /// Persists a token the backend issued on an arbitrary response.
    pub fn rotate_token(&self, token: &str) -> Result<(), StorageError> {
        self.durable.set(TOKEN_KEY, token)?;
        self.cookie.set(token);

        let mut identity = self.identity.write().unwrap_or_else(PoisonError::into_inner);
        if identity.user.is_some() {
            identity.token = Some(token.to_string());
        }
        Ok(())
    }

    /// Drops the identity from memory, durable storage and the cookie.
    /// Never fails: storage errors are logged and the rest still runs.
    pub fn clear(&self) {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Identity::default();

        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.durable.remove(key) {
                log::error!("Failed to remove {} from storage: {}", key, e);
            }
        }
        self.cookie.clear();
    }

    pub fn has_persisted_identity(&self) -> bool {
        self.durable.get(USER_KEY).is_some()
            || self.durable.get(TOKEN_KEY).is_some()
            || self.cookie.is_present()
    }
}
