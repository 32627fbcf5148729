//! Permission fetch plus rule evaluation.
//!
//! Loading is fail-closed: a permission set that cannot be fetched is all
//! `false`. Rule lookup stays fail-open: a target no rule covers is allowed.
//! Both hold at once, so an unlisted route is reachable even when the fetch
//! failed.

use entbridge_auth::{
    accessible_routes, check_menu_permission, check_route_permission, filter_accessible_menus,
    MenuItem, MenuPermissionRule, PermissionFlag, PermissionSet, Role, RoutePermissionRule,
    MENU_PERMISSIONS, ROUTE_PERMISSIONS,
};
use entbridge_core::{BridgeError, Failure};
use serde::Serialize;

use crate::context::AuthContext;

pub const PERMISSIONS_FAILED: &str = "Get permissions failed";
pub const DEFAULT_PERMISSION_ERROR: &str = "Failed to fetch permissions";

/// Permission set plus the reason it is empty, if it could not be loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionState {
    pub permissions: PermissionSet,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct PermissionResolver {
    ctx: AuthContext,
    routes: &'static [RoutePermissionRule],
    menus: &'static [MenuPermissionRule],
}

impl PermissionResolver {
    /// Resolver over the default route and menu tables.
    pub fn new(ctx: AuthContext) -> Self {
        Self::with_rules(ctx, ROUTE_PERMISSIONS, MENU_PERMISSIONS)
    }

    pub fn with_rules(
        ctx: AuthContext,
        routes: &'static [RoutePermissionRule],
        menus: &'static [MenuPermissionRule],
    ) -> Self {
        Self { ctx, routes, menus }
    }

    pub fn routes(&self) -> &'static [RoutePermissionRule] {
        self.routes
    }

    /// Role from the stored profile (see [`crate::SessionStore::role`]).
    pub fn current_role(&self) -> Option<Role> {
        self.ctx.sessions.role()
    }

    /// Current permission set from the server. Re-fetched on every call.
    pub async fn fetch_permissions(&self) -> Result<PermissionSet, Failure> {
        let Some(authorization) = self.ctx.sessions.authorization() else {
            return Err(Failure::from_error(&BridgeError::MissingCredential, PERMISSIONS_FAILED));
        };

        let envelope = self
            .ctx
            .backend
            .permissions(&authorization)
            .await
            .map_err(|err| {
                tracing::error!("permission request failed: {err}");
                Failure::from_error(&err, PERMISSIONS_FAILED)
            })?;

        // Server rejections keep their own message, even an empty one.
        envelope.into_result().map_err(|err| {
            let failure = Failure::from_error(&err, "");
            tracing::warn!(code = failure.code, "permission request rejected: {}", failure.message);
            failure
        })
    }

    /// All-`false` permissions with an error message when the fetch fails.
    pub async fn permissions_or_default(&self) -> PermissionState {
        match self.fetch_permissions().await {
            Ok(permissions) => PermissionState {
                permissions,
                error: None,
            },
            Err(failure) => {
                let message = if failure.message.is_empty() {
                    DEFAULT_PERMISSION_ERROR.to_string()
                } else {
                    failure.message
                };
                PermissionState {
                    permissions: PermissionSet::default(),
                    error: Some(message),
                }
            }
        }
    }

    /// `false` on any failure.
    pub async fn check_permission(&self, flag: PermissionFlag) -> bool {
        self.fetch_permissions()
            .await
            .is_ok_and(|permissions| permissions.has_permission(flag))
    }

    pub async fn check_route(&self, path: &str, role: Option<&Role>) -> bool {
        let state = self.permissions_or_default().await;
        check_route_permission(self.routes, path, &state.permissions, role)
    }

    pub async fn check_menu(&self, key: &str, role: Option<&Role>) -> bool {
        let state = self.permissions_or_default().await;
        check_menu_permission(self.menus, key, &state.permissions, role)
    }

    pub async fn visible_menus(&self, menus: Vec<MenuItem>, role: Option<&Role>) -> Vec<MenuItem> {
        let state = self.permissions_or_default().await;
        filter_accessible_menus(self.menus, menus, &state.permissions, role)
    }

    pub async fn accessible_routes(&self, role: Option<&Role>) -> Vec<&'static str> {
        let state = self.permissions_or_default().await;
        accessible_routes(self.routes, &state.permissions, role)
    }
}
