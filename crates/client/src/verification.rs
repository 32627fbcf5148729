//! Verification, refresh and server-side enterprise configuration.
//!
//! These operations return the raw server envelope. Transport and parse
//! faults are folded into a client-side failure envelope (`code: 1`) with a
//! fixed message, so callers only ever inspect `code`.

use entbridge_core::{ApiEnvelope, BridgeError, Failure};

use crate::backend::{EnterpriseConfig, RefreshData, VerifyData};
use crate::context::AuthContext;

pub const VERIFICATION_FAILED: &str = "Verification failed";
pub const REFRESH_FAILED: &str = "Token refresh failed";
pub const CONFIG_FAILED: &str = "Get enterprise config failed";

#[derive(Clone)]
pub struct VerificationClient {
    ctx: AuthContext,
}

impl VerificationClient {
    pub fn new(ctx: AuthContext) -> Self {
        Self { ctx }
    }

    /// Enterprise status of the current session.
    ///
    /// Without a stored credential this answers `No authorization` without
    /// touching the network.
    pub async fn verify(&self) -> ApiEnvelope<VerifyData> {
        let Some(authorization) = self.ctx.sessions.authorization() else {
            tracing::debug!("verification skipped: no stored authorization");
            return Failure::from_error(&BridgeError::MissingCredential, VERIFICATION_FAILED).into();
        };

        match self.ctx.backend.verify(&authorization).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!("enterprise verification request failed: {err}");
                Failure::from_error(&err, VERIFICATION_FAILED).into()
            }
        }
    }

    /// `true` only for a successful verification that flags an enterprise user.
    pub async fn is_enterprise_user(&self) -> bool {
        let envelope = self.verify().await;
        envelope.is_success() && envelope.data.is_some_and(|data| data.is_enterprise_user)
    }

    /// Exchange `new_token` for refreshed user data. The token is persisted
    /// only when the server accepts it. Single attempt.
    pub async fn refresh(&self, new_token: &str) -> ApiEnvelope<RefreshData> {
        match self.ctx.backend.refresh(new_token).await {
            Ok(envelope) if envelope.is_success() => {
                self.ctx.tokens.save(new_token);
                tracing::info!("enterprise token refreshed");
                envelope
            }
            Ok(envelope) => {
                tracing::warn!(code = envelope.code, "enterprise token refresh rejected: {}", envelope.message);
                envelope
            }
            Err(err) => {
                tracing::error!("enterprise token refresh request failed: {err}");
                Failure::from_error(&err, REFRESH_FAILED).into()
            }
        }
    }

    pub async fn config(&self) -> ApiEnvelope<EnterpriseConfig> {
        match self.ctx.backend.config().await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!("enterprise config request failed: {err}");
                Failure::from_error(&err, CONFIG_FAILED).into()
            }
        }
    }
}
