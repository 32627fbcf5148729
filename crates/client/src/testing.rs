//! In-process fake backend shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use entbridge_auth::PermissionSet;
use entbridge_core::{ApiEnvelope, BridgeError, BridgeResult};

use crate::backend::{
    EnterpriseBackend, EnterpriseConfig, LoginData, LoginResponse, RefreshData, VerifyData,
};
use crate::context::AuthContext;
use crate::location::StaticLocation;
use crate::storage::MemoryStore;

fn unreachable<T>() -> BridgeResult<T> {
    Err(BridgeError::transport("connection refused"))
}

/// Canned responses; every endpoint is unreachable until configured.
pub(crate) struct FakeBackend {
    login: BridgeResult<LoginResponse>,
    verify: BridgeResult<ApiEnvelope<VerifyData>>,
    refresh: BridgeResult<ApiEnvelope<RefreshData>>,
    permissions: BridgeResult<ApiEnvelope<PermissionSet>>,
    config: BridgeResult<ApiEnvelope<EnterpriseConfig>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            login: unreachable(),
            verify: unreachable(),
            refresh: unreachable(),
            permissions: unreachable(),
            config: unreachable(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn login_ok(mut self, authorization: Option<&str>) -> Self {
        self.login = Ok(LoginResponse {
            envelope: ApiEnvelope::success(sample_user(), "success"),
            authorization: authorization.map(str::to_string),
        });
        self
    }

    pub(crate) fn login(mut self, envelope: ApiEnvelope<LoginData>) -> Self {
        self.login = Ok(LoginResponse {
            envelope,
            authorization: Some("auth-from-header".into()),
        });
        self
    }

    pub(crate) fn verify(mut self, result: BridgeResult<ApiEnvelope<VerifyData>>) -> Self {
        self.verify = result;
        self
    }

    pub(crate) fn refresh(mut self, result: BridgeResult<ApiEnvelope<RefreshData>>) -> Self {
        self.refresh = result;
        self
    }

    pub(crate) fn permissions(mut self, result: BridgeResult<ApiEnvelope<PermissionSet>>) -> Self {
        self.permissions = result;
        self
    }

    pub(crate) fn config(mut self, result: BridgeResult<ApiEnvelope<EnterpriseConfig>>) -> Self {
        self.config = result;
        self
    }

    /// Endpoint calls so far, as `name` or `name:argument`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl EnterpriseBackend for FakeBackend {
    async fn login(&self, enterprise_token: &str) -> BridgeResult<LoginResponse> {
        self.record(format!("login:{enterprise_token}"));
        self.login.clone()
    }

    async fn verify(&self, authorization: &str) -> BridgeResult<ApiEnvelope<VerifyData>> {
        self.record(format!("verify:{authorization}"));
        self.verify.clone()
    }

    async fn refresh(&self, enterprise_token: &str) -> BridgeResult<ApiEnvelope<RefreshData>> {
        self.record(format!("refresh:{enterprise_token}"));
        self.refresh.clone()
    }

    async fn permissions(&self, authorization: &str) -> BridgeResult<ApiEnvelope<PermissionSet>> {
        self.record(format!("permissions:{authorization}"));
        self.permissions.clone()
    }

    async fn config(&self) -> BridgeResult<ApiEnvelope<EnterpriseConfig>> {
        self.record("config".into());
        self.config.clone()
    }
}

pub(crate) fn sample_user() -> LoginData {
    LoginData {
        id: "user-1".into(),
        access_token: "access-1".into(),
        nickname: "Ada".into(),
        email: "ada@example.com".into(),
        avatar: None,
        permissions: PermissionSet::default(),
        login_channel: "enterprise".into(),
    }
}

pub(crate) struct Harness {
    pub ctx: AuthContext,
    pub backend: Arc<FakeBackend>,
    pub store: Arc<MemoryStore>,
    pub location: Arc<StaticLocation>,
}

pub(crate) fn harness(backend: FakeBackend, href: &str) -> Harness {
    let backend = Arc::new(backend);
    let store = Arc::new(MemoryStore::new());
    let location = Arc::new(StaticLocation::parse(href).unwrap());
    let ctx = AuthContext::new(backend.clone(), store.clone(), location.clone());
    Harness {
        ctx,
        backend,
        store,
        location,
    }
}

impl Harness {
    /// Pretend a first-party session already exists.
    pub(crate) fn logged_in(self, authorization: &str) -> Self {
        use crate::storage::KeyValueStore;
        self.store
            .set(crate::session_store::AUTHORIZATION_KEY, authorization)
            .unwrap();
        self
    }
}
