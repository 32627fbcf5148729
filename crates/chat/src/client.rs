//! Chat session provisioning.
//!
//! Wire contract:
//!
//! - create: `POST {base}/api/v1/chats/{chat_id}/sessions`, body `{name, user_id}`
//! - list: `GET {base}/api/v1/chats/{chat_id}/sessions?user_id={id}&page=1&page_size=50`
//! - share page: `{base}/chat/share?shared_id={session_id}&from=chat&auth={auth}`
//!
//! Both API calls carry `Authorization: Bearer {api_key}`. URLs are built by
//! plain interpolation (no percent-encoding), matching what the service
//! expects from its other clients.

use chrono::{DateTime, Utc};
use entbridge_core::{ApiEnvelope, BridgeError};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ChatConfig;
use crate::error::ChatError;

pub const LIST_PAGE_SIZE: u32 = 50;

/// Session as returned by the chat service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
}

impl ChatSession {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time.and_then(DateTime::from_timestamp_millis)
    }
}

/// Display name for a new session.
pub fn session_name(user_id: &str, user_name: Option<&str>) -> String {
    match user_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{name}'s chat session"),
        None => format!("User {user_id}'s session"),
    }
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: ChatConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/api/v1/chats/{}/sessions",
            self.config.base_url, self.config.chat_id
        )
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.api_key)
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<ChatSession, ChatError> {
        let body = json!({
            "name": session_name(user_id, user_name),
            "user_id": user_id,
        });

        let resp = self
            .http
            .post(self.sessions_url())
            .header(AUTHORIZATION, self.bearer())
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::transport(e.to_string()))?;

        let envelope: ApiEnvelope<ChatSession> = resp
            .json()
            .await
            .map_err(|e| BridgeError::parse(e.to_string()))?;

        let session = envelope.into_result()?;
        tracing::info!(user_id, session_id = %session.id, "chat session created");
        Ok(session)
    }

    /// Sessions of `user_id`, newest first as ordered by the service.
    /// Any failure yields an empty list.
    pub async fn list_sessions(&self, user_id: &str) -> Vec<ChatSession> {
        match self.try_list_sessions(user_id).await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(user_id, "listing chat sessions failed: {err}");
                Vec::new()
            }
        }
    }

    async fn try_list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, BridgeError> {
        let url = format!(
            "{}?user_id={user_id}&page=1&page_size={LIST_PAGE_SIZE}",
            self.sessions_url()
        );

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
            .map_err(|e| BridgeError::transport(e.to_string()))?;

        let envelope: ApiEnvelope<Vec<ChatSession>> = resp
            .json()
            .await
            .map_err(|e| BridgeError::parse(e.to_string()))?;

        // A successful answer with no data is an empty list, not a failure.
        if envelope.is_success() {
            return Ok(envelope.data.unwrap_or_default());
        }
        envelope.into_result()
    }

    /// Id of the user's first listed session, creating one when there is none.
    pub async fn get_or_create_session(
        &self,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<String, ChatError> {
        if let Some(existing) = self.list_sessions(user_id).await.into_iter().next() {
            tracing::debug!(user_id, session_id = %existing.id, "reusing chat session");
            return Ok(existing.id);
        }

        Ok(self.create_session(user_id, user_name).await?.id)
    }

    pub fn share_url(&self, session_id: &str) -> String {
        format!(
            "{}/chat/share?shared_id={session_id}&from=chat&auth={}",
            self.config.base_url, self.config.auth
        )
    }

    /// Share-page URL of the user's session.
    pub async fn user_chat_url(
        &self,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<String, ChatError> {
        let session_id = self.get_or_create_session(user_id, user_name).await?;
        Ok(self.share_url(&session_id))
    }
}
