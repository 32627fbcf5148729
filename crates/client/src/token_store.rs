//! Best-effort persistence of the enterprise token.

use std::sync::{Arc, Mutex, PoisonError};

use crate::storage::KeyValueStore;

pub const ENTERPRISE_TOKEN_KEY: &str = "enterprise_token";

/// Single enterprise token on top of a [`KeyValueStore`].
///
/// Nothing here returns an error. Backend failures are logged and the store
/// falls back to the last token it saw in this process.
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
    last_seen: Mutex<Option<String>>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            last_seen: Mutex::new(None),
        }
    }

    pub fn save(&self, token: &str) {
        self.remember(Some(token.to_string()));
        if let Err(err) = self.backend.set(ENTERPRISE_TOKEN_KEY, token) {
            tracing::warn!("failed to persist enterprise token, keeping it in memory: {err:?}");
        }
    }

    /// Stored token; an empty value counts as absent.
    pub fn load(&self) -> Option<String> {
        match self.backend.get(ENTERPRISE_TOKEN_KEY) {
            Ok(token) => {
                let token = token.filter(|t| !t.is_empty());
                self.remember(token.clone());
                token
            }
            Err(err) => {
                tracing::warn!("failed to read enterprise token, using in-memory copy: {err:?}");
                self.last_seen
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            }
        }
    }

    pub fn clear(&self) {
        self.remember(None);
        if let Err(err) = self.backend.remove(ENTERPRISE_TOKEN_KEY) {
            tracing::warn!("failed to clear enterprise token: {err:?}");
        }
    }

    fn remember(&self, token: Option<String>) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }
}
