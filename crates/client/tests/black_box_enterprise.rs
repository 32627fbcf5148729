use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use entbridge_auth::PermissionFlag;
use entbridge_client::{
    Access, AuthContext, EnterpriseBackend, FileStore, HttpBackend, KeyValueStore, Location,
    StaticLocation,
};
use serde_json::{json, Value};

const GOOD_TOKEN: &str = "good-token";
const FRESH_TOKEN: &str = "fresh-token";
const CREDENTIAL: &str = "auth-good";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(CREDENTIAL)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"code": 401, "data": false, "message": "Unauthorized"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["enterprise_token"] != GOOD_TOKEN {
        return Json(json!({"code": 109, "data": false, "message": "Invalid enterprise token"}))
            .into_response();
    }

    (
        [(header::AUTHORIZATION, CREDENTIAL)],
        Json(json!({
            "code": 0,
            "data": {
                "id": "u-1",
                "access_token": "access-1",
                "nickname": "Ada",
                "email": "ada@example.com",
                "permissions": {"can_chat": true},
                "login_channel": "enterprise"
            },
            "message": "success"
        })),
    )
        .into_response()
}

async fn verify(headers: HeaderMap) -> Response {
    if !has_json_content_type(&headers) {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "code": 0,
        "data": {"is_enterprise_user": true, "user_id": "u-1", "enterprise_source": "sso"},
        "message": "User verification successful"
    }))
    .into_response()
}

async fn permissions(headers: HeaderMap) -> Response {
    if !has_json_content_type(&headers) {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "code": 0,
        "data": {"can_manage_knowledge": false, "can_chat": true, "can_manage_users": false, "can_access_system": false},
        "message": "Permissions retrieved successfully"
    }))
    .into_response()
}

async fn refresh(Json(body): Json<Value>) -> Json<Value> {
    if body["enterprise_token"] == FRESH_TOKEN {
        Json(json!({
            "code": 0,
            "data": {"user_id": "u-1", "access_token": "access-2"},
            "message": "Enterprise token refreshed successfully"
        }))
    } else {
        Json(json!({"code": 109, "data": false, "message": "Invalid enterprise token for refresh"}))
    }
}

async fn config() -> Json<Value> {
    Json(json!({
        "code": 0,
        "data": {"enabled": true, "supported_roles": ["admin", "normal"]},
        "message": "Enterprise config retrieved successfully"
    }))
}

fn enterprise_api() -> Router {
    Router::new()
        .route("/v1/user/enterprise/login", post(login))
        .route("/v1/user/enterprise/verify", get(verify))
        .route("/v1/user/enterprise/refresh", post(refresh))
        .route("/v1/user/enterprise/permissions", get(permissions))
        .route("/v1/user/enterprise/config", get(config))
}

struct Client {
    ctx: AuthContext,
    store: Arc<FileStore>,
    location: Arc<StaticLocation>,
    _dir: tempfile::TempDir,
}

fn client(api_url: &str, page: &str) -> Client {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("store.json")));
    let location = Arc::new(StaticLocation::parse(page).unwrap());
    let ctx = AuthContext::new(
        Arc::new(HttpBackend::new(api_url)),
        store.clone(),
        location.clone(),
    );
    Client {
        ctx,
        store,
        location,
        _dir: dir,
    }
}

#[tokio::test]
async fn enterprise_token_in_address_logs_in_end_to_end() {
    let server = TestServer::spawn(enterprise_api()).await;
    let c = client(
        &server.base_url,
        "https://app.test/chat?enterprise_token=good-token&tab=recent",
    );

    assert_eq!(c.ctx.bridge().bootstrap(false).await, Access::Granted);

    // Address cleaned, token and session persisted to disk.
    assert_eq!(c.location.current().as_str(), "https://app.test/chat?tab=recent");
    assert_eq!(c.store.get("enterprise_token").unwrap().as_deref(), Some(GOOD_TOKEN));
    assert_eq!(c.store.get("Authorization").unwrap().as_deref(), Some(CREDENTIAL));
    assert_eq!(c.store.get("Token").unwrap().as_deref(), Some("access-1"));

    let verification = c.ctx.verification().verify().await;
    assert!(verification.is_success());
    let data = verification.data.unwrap();
    assert!(data.is_enterprise_user);
    assert_eq!(data.enterprise_source.as_deref(), Some("sso"));

    let resolver = c.ctx.resolver();
    assert!(resolver.check_permission(PermissionFlag::CanChat).await);
    assert!(resolver.check_route("/chat/42", None).await);
    assert!(!resolver.check_route("/knowledge", None).await);
    assert!(resolver.check_route("/random-unlisted", None).await);
}

#[tokio::test]
async fn rejected_token_redirects_and_leaves_no_state() {
    let server = TestServer::spawn(enterprise_api()).await;
    let c = client(&server.base_url, "https://app.test/?enterprise_token=forged");

    let failure = c.ctx.bridge().exchange("forged").await.unwrap_err();
    assert_eq!(failure.code, 109);
    assert_eq!(failure.message, "Invalid enterprise token");

    assert_eq!(c.ctx.bridge().bootstrap(false).await, Access::RedirectToLogin);
    assert_eq!(c.store.get("Authorization").unwrap(), None);
    assert_eq!(c.store.get("enterprise_token").unwrap(), None);
}

#[tokio::test]
async fn auto_login_reuses_a_verified_session() {
    let server = TestServer::spawn(enterprise_api()).await;
    let c = client(&server.base_url, "https://app.test/?enterprise_token=good-token");
    let bridge = c.ctx.bridge();

    assert!(bridge.auto_login().await);
    assert!(c.ctx.sessions.is_logged_in());

    // Stored token plus a verified session: still true on a fresh handle.
    assert!(c.ctx.bridge().auto_login().await);

    bridge.logout();
    assert_eq!(c.location.current().path(), "/login");
    assert!(!c.ctx.sessions.is_logged_in());
    assert_eq!(c.store.get("enterprise_token").unwrap(), None);
}

#[tokio::test]
async fn http_error_status_still_yields_the_envelope() {
    let server = TestServer::spawn(enterprise_api()).await;
    let backend = HttpBackend::new(server.base_url.as_str());

    let envelope = backend.verify("someone-else").await.unwrap();
    assert_eq!(envelope.code, 401);
    assert_eq!(envelope.message, "Unauthorized");
    assert!(envelope.data.is_none());
}

#[tokio::test]
async fn refresh_and_config_round_trip() {
    let server = TestServer::spawn(enterprise_api()).await;
    let c = client(&server.base_url, "https://app.test/");
    let verification = c.ctx.verification();

    let rejected = verification.refresh("stale").await;
    assert_eq!(rejected.code, 109);
    assert_eq!(c.ctx.tokens.load(), None);

    let accepted = verification.refresh(FRESH_TOKEN).await;
    assert!(accepted.is_success());
    assert_eq!(accepted.data.unwrap().access_token.as_deref(), Some("access-2"));
    assert_eq!(c.ctx.tokens.load().as_deref(), Some(FRESH_TOKEN));

    let config = verification.config().await.data.unwrap();
    assert!(config.enabled);
    assert_eq!(config.supported_roles, vec!["admin", "normal"]);
}

#[tokio::test]
async fn non_json_body_is_a_generic_failure() {
    let app = Router::new().fallback(|| async { "<html>bad gateway</html>" });
    let server = TestServer::spawn(app).await;
    let c = client(&server.base_url, "https://app.test/");

    let config = c.ctx.verification().config().await;
    assert_eq!(config.code, 1);
    assert_eq!(config.message, "Get enterprise config failed");

    let failure = c.ctx.bridge().exchange(GOOD_TOKEN).await.unwrap_err();
    assert_eq!(failure.message, "Enterprise login request failed");
}

#[tokio::test]
async fn unreachable_api_fails_closed() {
    // Reserve a port, then release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = client(&format!("http://{addr}"), "https://app.test/");
    c.store.set("Authorization", CREDENTIAL).unwrap();

    let failure = c.ctx.bridge().exchange(GOOD_TOKEN).await.unwrap_err();
    assert_eq!(failure.message, "Enterprise login request failed");

    let state = c.ctx.resolver().permissions_or_default().await;
    assert_eq!(state.error.as_deref(), Some("Get permissions failed"));
    assert!(!c.ctx.resolver().check_route("/chat", None).await);
}
