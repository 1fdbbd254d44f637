//! Session token storage.
//!
//! Holds the single bearer token for the lifetime of the process. Nothing
//! else about the session is persisted client-side.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to the session's bearer token.
///
/// Cloning shares the same underlying slot; the transport clears it on any
/// 401 so every holder observes the expiry at once.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session that already holds a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.write() = Some(token.into());
    }

    pub fn token(&self) -> Option<String> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Drop the stored token (logout, or a 401 from the service).
    pub fn clear(&self) {
        *self.write() = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<String>> {
        self.token.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
