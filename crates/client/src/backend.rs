//! Remote enterprise endpoints.
//!
//! The bridge talks to the backend through [`EnterpriseBackend`] so tests can
//! swap in an in-process fake. [`HttpBackend`] is the `reqwest` implementation.

use async_trait::async_trait;
use entbridge_auth::PermissionSet;
use entbridge_core::{ApiEnvelope, BridgeError, BridgeResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const LOGIN_PATH: &str = "/v1/user/enterprise/login";
pub const VERIFY_PATH: &str = "/v1/user/enterprise/verify";
pub const REFRESH_PATH: &str = "/v1/user/enterprise/refresh";
pub const PERMISSIONS_PATH: &str = "/v1/user/enterprise/permissions";
pub const CONFIG_PATH: &str = "/v1/user/enterprise/config";

/// User payload returned by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub login_channel: String,
}

/// Login envelope plus the credential from the `Authorization` response header.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub envelope: ApiEnvelope<LoginData>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyData {
    #[serde(default)]
    pub is_enterprise_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_user_id: Option<String>,
}

/// Whether enterprise login is enabled server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub supported_roles: Vec<String>,
}

/// Raw endpoint calls. Errors are transport or parse faults only; a non-zero
/// `code` is a successful call and comes back inside the envelope.
#[async_trait]
pub trait EnterpriseBackend: Send + Sync {
    async fn login(&self, enterprise_token: &str) -> BridgeResult<LoginResponse>;

    async fn verify(&self, authorization: &str) -> BridgeResult<ApiEnvelope<VerifyData>>;

    async fn refresh(&self, enterprise_token: &str) -> BridgeResult<ApiEnvelope<RefreshData>>;

    async fn permissions(&self, authorization: &str) -> BridgeResult<ApiEnvelope<PermissionSet>>;

    async fn config(&self) -> BridgeResult<ApiEnvelope<EnterpriseConfig>>;
}

/// `reqwest` client for the enterprise endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
}

impl HttpBackend {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> BridgeResult<ApiEnvelope<T>> {
        let mut req = self
            .client
            .get(self.url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(authorization) = authorization {
            req = req.header(AUTHORIZATION, authorization);
        }

        let resp = req.send().await.map_err(|e| BridgeError::transport(e.to_string()))?;
        decode(resp).await
    }

    async fn post_token(&self, path: &str, enterprise_token: &str) -> BridgeResult<reqwest::Response> {
        self.client
            .post(self.url(path))
            .json(&json!({ "enterprise_token": enterprise_token }))
            .send()
            .await
            .map_err(|e| BridgeError::transport(e.to_string()))
    }
}

/// Decode the body regardless of HTTP status; the envelope code is what counts.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> BridgeResult<ApiEnvelope<T>> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| BridgeError::transport(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::debug!(status = status.as_u16(), "undecodable response body");
        BridgeError::parse(e.to_string())
    })
}

#[async_trait]
impl EnterpriseBackend for HttpBackend {
    async fn login(&self, enterprise_token: &str) -> BridgeResult<LoginResponse> {
        let resp = self.post_token(LOGIN_PATH, enterprise_token).await?;
        let authorization = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        let envelope = decode(resp).await?;
        Ok(LoginResponse {
            envelope,
            authorization,
        })
    }

    async fn verify(&self, authorization: &str) -> BridgeResult<ApiEnvelope<VerifyData>> {
        self.get(VERIFY_PATH, Some(authorization)).await
    }

    async fn refresh(&self, enterprise_token: &str) -> BridgeResult<ApiEnvelope<RefreshData>> {
        let resp = self.post_token(REFRESH_PATH, enterprise_token).await?;
        decode(resp).await
    }

    async fn permissions(&self, authorization: &str) -> BridgeResult<ApiEnvelope<PermissionSet>> {
        self.get(PERMISSIONS_PATH, Some(authorization)).await
    }

    async fn config(&self) -> BridgeResult<ApiEnvelope<EnterpriseConfig>> {
        self.get(CONFIG_PATH, None).await
    }
}
