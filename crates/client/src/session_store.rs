//! First-party session bundle: `Authorization`, `userInfo`, `Token`.

use std::sync::Arc;

use entbridge_auth::Role;
use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const AUTHORIZATION_KEY: &str = "Authorization";
pub const USER_INFO_KEY: &str = "userInfo";
pub const ACCESS_TOKEN_KEY: &str = "Token";

/// Profile persisted under `userInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Everything written on a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBundle {
    pub authorization: String,
    pub user_info: UserInfo,
    pub access_token: String,
}

pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn authorization(&self) -> Option<String> {
        self.read(AUTHORIZATION_KEY).filter(|a| !a.is_empty())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.authorization().is_some()
    }

    /// Stored profile. An unreadable profile is treated as absent.
    pub fn user_info(&self) -> Option<UserInfo> {
        let raw = self.read(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!("ignoring malformed userInfo: {err}");
                None
            }
        }
    }

    /// Role from the stored profile: absent when there is no profile, and
    /// `normal` when the profile names none or cannot be read.
    pub fn role(&self) -> Option<Role> {
        self.read(USER_INFO_KEY).filter(|raw| !raw.is_empty())?;
        let role = self.user_info().and_then(|info| info.role).filter(|r| !r.is_empty());
        Some(role.map(Role::new).unwrap_or(Role::NORMAL))
    }

    /// Write all three keys. On failure, whatever was written is removed again.
    pub fn persist(&self, bundle: &SessionBundle) -> anyhow::Result<()> {
        let user_info = serde_json::to_string(&bundle.user_info)?;
        let written = self
            .backend
            .set(AUTHORIZATION_KEY, &bundle.authorization)
            .and_then(|()| self.backend.set(USER_INFO_KEY, &user_info))
            .and_then(|()| self.backend.set(ACCESS_TOKEN_KEY, &bundle.access_token));

        if written.is_err() {
            self.clear();
        }
        written
    }

    pub fn clear(&self) {
        for key in [AUTHORIZATION_KEY, USER_INFO_KEY, ACCESS_TOKEN_KEY] {
            if let Err(err) = self.backend.remove(key) {
                tracing::warn!(key, "failed to remove session key: {err:?}");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, "failed to read session key: {err:?}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn bundle() -> SessionBundle {
        SessionBundle {
            authorization: "auth-1".into(),
            user_info: UserInfo {
                avatar: String::new(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: None,
            },
            access_token: "access-1".into(),
        }
    }

    #[test]
    fn persist_writes_the_three_keys() {
        let backend = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend.clone());
        store.persist(&bundle()).unwrap();

        assert_eq!(store.authorization().as_deref(), Some("auth-1"));
        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(
            backend.get(USER_INFO_KEY).unwrap().as_deref(),
            Some(r#"{"avatar":"","name":"Ada","email":"ada@example.com"}"#)
        );
        assert!(store.is_logged_in());

        store.clear();
        assert!(backend.is_empty());
        assert!(!store.is_logged_in());
    }

    #[test]
    fn role_defaults_to_normal_only_when_a_profile_exists() {
        let backend = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend.clone());
        assert_eq!(store.role(), None);

        backend.set(USER_INFO_KEY, r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(store.role(), Some(Role::NORMAL));

        backend
            .set(USER_INFO_KEY, r#"{"name":"Ada","role":"admin"}"#)
            .unwrap();
        assert_eq!(store.role(), Some(Role::ADMIN));
    }

    #[test]
    fn malformed_profile_reads_as_normal_role() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(USER_INFO_KEY, "{oops").unwrap();
        let store = SessionStore::new(backend);
        assert_eq!(store.user_info(), None);
        assert_eq!(store.role(), Some(Role::NORMAL));
    }

    #[test]
    fn empty_profile_has_no_role() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(USER_INFO_KEY, "").unwrap();
        assert_eq!(SessionStore::new(backend).role(), None);
    }
}
