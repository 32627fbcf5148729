//! `entbridge` entry point.
//!
//! Runs the application-entry flow once against the configured API:
//!
//! ```text
//! entbridge [PAGE_URL]
//! ```
//!
//! `PAGE_URL` plays the browser address; pass `?enterprise_token=...` to log
//! in with an enterprise token.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use entbridge_client::{Access, AuthContext, ClientConfig, StaticLocation};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    entbridge_observability::init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    let page = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("{}/", config.api_url));
    let location = StaticLocation::parse(&page)
        .with_context(|| format!("invalid page address {page:?}"))?;

    let ctx = AuthContext::from_config(&config, Arc::new(location));
    let access = ctx.bridge().bootstrap(ctx.sessions.is_logged_in()).await;

    match access {
        Access::Granted => {
            let resolver = ctx.resolver();
            let role = resolver.current_role();
            let state = resolver.permissions_or_default().await;
            if let Some(error) = &state.error {
                tracing::warn!("permissions unavailable: {error}");
            }

            let routes = resolver.accessible_routes(role.as_ref()).await;
            tracing::info!(
                permissions = ?state.permissions.granted(),
                role = ?role.as_ref().map(|r| r.as_str()),
                ?routes,
                "access granted"
            );
            Ok(ExitCode::SUCCESS)
        }
        Access::RedirectToLogin => {
            tracing::warn!("no usable session; login required");
            Ok(ExitCode::from(2))
        }
    }
}
