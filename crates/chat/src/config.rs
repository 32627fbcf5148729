//! Chat service settings.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const BASE_URL_VAR: &str = "ENTBRIDGE_CHAT_BASE_URL";
pub const API_KEY_VAR: &str = "ENTBRIDGE_CHAT_API_KEY";
pub const CHAT_ID_VAR: &str = "ENTBRIDGE_CHAT_ID";
pub const AUTH_VAR: &str = "ENTBRIDGE_CHAT_AUTH";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Chat service root, without a trailing `/`.
    pub base_url: String,
    /// Bearer key for the session API.
    pub api_key: String,
    /// Assistant the sessions belong to.
    pub chat_id: String,
    /// Share-page token embedded in chat URLs.
    pub auth: String,
}

impl ChatConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        chat_id: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            chat_id: chat_id.into(),
            auth: auth.into(),
        }
    }

    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Every setting is required; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let require = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ChatError::MissingSetting(var))
        };

        Ok(Self::new(
            require(BASE_URL_VAR)?,
            require(API_KEY_VAR)?,
            require(CHAT_ID_VAR)?,
            require(AUTH_VAR)?,
        ))
    }
}

// Keys stay out of logs.
impl core::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("auth", &"<redacted>")
            .finish()
    }
}
