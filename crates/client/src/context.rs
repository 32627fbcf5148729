//! Explicit wiring of stores, backend and location.

use std::sync::Arc;

use crate::backend::{EnterpriseBackend, HttpBackend};
use crate::bridge::SessionBridge;
use crate::config::ClientConfig;
use crate::location::Location;
use crate::resolver::PermissionResolver;
use crate::session_store::SessionStore;
use crate::storage::{FileStore, KeyValueStore};
use crate::token_store::TokenStore;
use crate::verification::VerificationClient;

/// Shared state handed to every bridge, verification and resolver handle.
///
/// Built once at startup. Cloning is cheap and every clone sees the same
/// stores.
#[derive(Clone)]
pub struct AuthContext {
    pub backend: Arc<dyn EnterpriseBackend>,
    pub tokens: Arc<TokenStore>,
    pub sessions: Arc<SessionStore>,
    pub location: Arc<dyn Location>,
}

impl AuthContext {
    pub fn new(
        backend: Arc<dyn EnterpriseBackend>,
        store: Arc<dyn KeyValueStore>,
        location: Arc<dyn Location>,
    ) -> Self {
        Self {
            backend,
            tokens: Arc::new(TokenStore::new(store.clone())),
            sessions: Arc::new(SessionStore::new(store)),
            location,
        }
    }

    /// HTTP backend against `config.api_url`, file storage at `config.store_path`.
    pub fn from_config(config: &ClientConfig, location: Arc<dyn Location>) -> Self {
        tracing::debug!(api_url = %config.api_url, store_path = ?config.store_path, "building auth context");
        Self::new(
            Arc::new(HttpBackend::new(config.api_url.clone())),
            Arc::new(FileStore::new(config.store_path.clone())),
            location,
        )
    }

    pub fn bridge(&self) -> SessionBridge {
        SessionBridge::new(self.clone())
    }

    pub fn verification(&self) -> VerificationClient {
        VerificationClient::new(self.clone())
    }

    pub fn resolver(&self) -> PermissionResolver {
        PermissionResolver::new(self.clone())
    }
}
