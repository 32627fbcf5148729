//! Enterprise token to first-party session bridge.
//!
//! Token discovery order:
//!
//! - `enterprise_token` query parameter of the current address (then removed
//!   from the address and persisted)
//! - the token persisted by an earlier discovery
//!
//! Every remote failure comes back as a [`Failure`]; nothing here panics or
//! raises a different kind of error for network faults.

use entbridge_core::{Failure, RetCode};
use serde::Serialize;

use crate::backend::{LoginData, LoginResponse};
use crate::context::AuthContext;
use crate::location::{query_param, without_query_param};
use crate::session_store::{SessionBundle, UserInfo};
use crate::verification::VerificationClient;

pub const ENTERPRISE_TOKEN_PARAM: &str = "enterprise_token";
pub const LOGIN_PATH: &str = "/login";

pub const LOGIN_FAILED: &str = "Enterprise login failed";
pub const LOGIN_REQUEST_FAILED: &str = "Enterprise login request failed";
pub const NO_TOKEN: &str = "No enterprise token available";

/// Result of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Credential from the `Authorization` response header, when sent.
    pub authorization: Option<String>,
    pub user: LoginData,
}

impl Session {
    pub fn nickname(&self) -> &str {
        &self.user.nickname
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn avatar(&self) -> &str {
        self.user.avatar.as_deref().unwrap_or_default()
    }

    pub fn access_token(&self) -> &str {
        &self.user.access_token
    }
}

/// Outcome of [`SessionBridge::bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Granted,
    RedirectToLogin,
}

#[derive(Clone)]
pub struct SessionBridge {
    ctx: AuthContext,
    verification: VerificationClient,
}

impl SessionBridge {
    pub fn new(ctx: AuthContext) -> Self {
        let verification = VerificationClient::new(ctx.clone());
        Self { ctx, verification }
    }

    /// Token from the address (consumed) or from storage.
    pub fn discover_token(&self) -> Option<String> {
        let current = self.ctx.location.current();
        if let Some(token) = query_param(&current, ENTERPRISE_TOKEN_PARAM) {
            self.ctx
                .location
                .replace(without_query_param(&current, ENTERPRISE_TOKEN_PARAM));
            self.ctx.tokens.save(&token);
            tracing::debug!("enterprise token taken from the address");
            return Some(token);
        }

        self.ctx.tokens.load()
    }

    pub fn has_enterprise_token(&self) -> bool {
        self.discover_token().is_some()
    }

    /// Exchange `token` for a session and persist the session bundle.
    ///
    /// Nothing is persisted unless the server answers `code == 0` with data.
    pub async fn exchange(&self, token: &str) -> Result<Session, Failure> {
        let LoginResponse {
            envelope,
            authorization,
        } = self.ctx.backend.login(token).await.map_err(|err| {
            tracing::error!("enterprise login request failed: {err}");
            Failure::from_error(&err, LOGIN_REQUEST_FAILED)
        })?;

        let user = envelope.into_result().map_err(|err| {
            let failure = Failure::from_error(&err, LOGIN_FAILED);
            tracing::warn!(code = failure.code, "enterprise login rejected: {}", failure.message);
            failure
        })?;

        match &authorization {
            Some(credential) => {
                let bundle = SessionBundle {
                    authorization: credential.clone(),
                    user_info: UserInfo {
                        avatar: user.avatar.clone().unwrap_or_default(),
                        name: user.nickname.clone(),
                        email: user.email.clone(),
                        role: None,
                    },
                    access_token: user.access_token.clone(),
                };
                if let Err(err) = self.ctx.sessions.persist(&bundle) {
                    tracing::warn!("failed to persist enterprise session: {err:?}");
                }
            }
            None => tracing::warn!("login response carried no Authorization header; session not persisted"),
        }

        tracing::info!(user_id = %user.id, login_channel = %user.login_channel, "enterprise login succeeded");
        Ok(Session {
            authorization,
            user,
        })
    }

    /// [`Self::exchange`] with the discovered token. No token, no request.
    pub async fn exchange_discovered(&self) -> Result<Session, Failure> {
        match self.discover_token() {
            Some(token) => self.exchange(&token).await,
            None => Err(Failure::new(RetCode::FAILURE, NO_TOKEN)),
        }
    }

    /// Log in with the discovered token unless the current session is
    /// already a verified enterprise session.
    pub async fn auto_login(&self) -> bool {
        let Some(token) = self.discover_token() else {
            tracing::debug!("auto login skipped: no enterprise token");
            return false;
        };

        if self.ctx.sessions.is_logged_in() {
            let verification = self.verification.verify().await;
            if verification.is_success()
                && verification.data.is_some_and(|data| data.is_enterprise_user)
            {
                tracing::debug!("existing session verified as enterprise user");
                return true;
            }
        }

        self.exchange(&token).await.is_ok()
    }

    /// Drop every credential and send the user to the login page.
    pub fn logout(&self) {
        self.ctx.tokens.clear();
        self.ctx.sessions.clear();
        self.ctx.location.navigate(LOGIN_PATH);
        tracing::info!("enterprise session cleared");
    }

    /// Application-entry decision.
    ///
    /// A failed auto login clears the enterprise token so the next entry does
    /// not retry it.
    pub async fn bootstrap(&self, is_logged_in: bool) -> Access {
        if is_logged_in {
            return Access::Granted;
        }

        if !self.has_enterprise_token() {
            return Access::RedirectToLogin;
        }

        if self.auto_login().await {
            Access::Granted
        } else {
            tracing::warn!("enterprise auto login failed; clearing token");
            self.ctx.tokens.clear();
            Access::RedirectToLogin
        }
    }
}
