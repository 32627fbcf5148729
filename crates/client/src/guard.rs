//! Rendering decisions for permission-gated regions.
//!
//! [`render`] is the whole contract: a pure function from a determination and
//! the caller's slots to what should be shown. The guard types only produce
//! the determination.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use entbridge_auth::{route_description, PermissionFlag, Role};
use serde::Serialize;

use crate::resolver::PermissionResolver;

pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions";
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to access this feature";
pub const INSUFFICIENT_ROLE: &str = "Insufficient role";
pub const ROLE_DENIED_MESSAGE: &str = "Your role is not allowed to access this feature";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Determination {
    Pending,
    Resolved(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Render<T> {
    Loading,
    Children(T),
    Fallback(T),
    Blocked { title: String, message: String },
    Nothing,
}

/// Caller-supplied slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardProps<T> {
    pub children: T,
    pub fallback: Option<T>,
    /// Show the blocked indicator when denied without a fallback.
    pub show_error: bool,
    pub error_message: Option<String>,
}

impl<T> GuardProps<T> {
    pub fn new(children: T) -> Self {
        Self {
            children,
            fallback: None,
            show_error: true,
            error_message: None,
        }
    }

    pub fn with_fallback(mut self, fallback: T) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn hide_error(mut self) -> Self {
        self.show_error = false;
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Decide what to show. `Pending` always renders [`Render::Loading`].
pub fn render<T>(
    determination: Determination,
    props: GuardProps<T>,
    title: &str,
    default_message: &str,
) -> Render<T> {
    match determination {
        Determination::Pending => Render::Loading,
        Determination::Resolved(true) => Render::Children(props.children),
        Determination::Resolved(false) => match props.fallback {
            Some(fallback) => Render::Fallback(fallback),
            None if props.show_error => Render::Blocked {
                title: title.to_string(),
                message: props
                    .error_message
                    .unwrap_or_else(|| default_message.to_string()),
            },
            None => Render::Nothing,
        },
    }
}

/// Something that can decide whether a region is shown.
#[async_trait]
pub trait Guard: Send + Sync {
    fn title(&self) -> &str;

    fn default_message(&self, resolver: &PermissionResolver) -> String;

    async fn determine(&self, resolver: &PermissionResolver) -> Determination;
}

/// Resolve `guard` and render `props` with its title and message.
pub async fn guard<G, T>(guard: &G, resolver: &PermissionResolver, props: GuardProps<T>) -> Render<T>
where
    G: Guard + ?Sized,
{
    let determination = guard.determine(resolver).await;
    render(
        determination,
        props,
        guard.title(),
        &guard.default_message(resolver),
    )
}

/// Single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGuard {
    pub permission: PermissionFlag,
}

#[async_trait]
impl Guard for PermissionGuard {
    fn title(&self) -> &str {
        INSUFFICIENT_PERMISSIONS
    }

    fn default_message(&self, _resolver: &PermissionResolver) -> String {
        PERMISSION_DENIED_MESSAGE.to_string()
    }

    async fn determine(&self, resolver: &PermissionResolver) -> Determination {
        Determination::Resolved(resolver.check_permission(self.permission).await)
    }
}

/// Several flags; all of them unless `require_all` is turned off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPermissionGuard {
    pub permissions: Vec<PermissionFlag>,
    pub require_all: bool,
}

impl MultiPermissionGuard {
    pub fn all_of(permissions: impl Into<Vec<PermissionFlag>>) -> Self {
        Self {
            permissions: permissions.into(),
            require_all: true,
        }
    }

    pub fn any_of(permissions: impl Into<Vec<PermissionFlag>>) -> Self {
        Self {
            permissions: permissions.into(),
            require_all: false,
        }
    }
}

#[async_trait]
impl Guard for MultiPermissionGuard {
    fn title(&self) -> &str {
        INSUFFICIENT_PERMISSIONS
    }

    fn default_message(&self, _resolver: &PermissionResolver) -> String {
        PERMISSION_DENIED_MESSAGE.to_string()
    }

    async fn determine(&self, resolver: &PermissionResolver) -> Determination {
        let state = resolver.permissions_or_default().await;
        let allowed = if self.require_all {
            state.permissions.has_all_permissions(&self.permissions)
        } else {
            state.permissions.has_any_permission(&self.permissions)
        };
        Determination::Resolved(allowed)
    }
}

/// Role taken from the stored profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    pub allowed_roles: Vec<Role>,
}

#[async_trait]
impl Guard for RoleGuard {
    fn title(&self) -> &str {
        INSUFFICIENT_ROLE
    }

    fn default_message(&self, _resolver: &PermissionResolver) -> String {
        ROLE_DENIED_MESSAGE.to_string()
    }

    async fn determine(&self, resolver: &PermissionResolver) -> Determination {
        let role = resolver.current_role();
        Determination::Resolved(role.is_some_and(|role| self.allowed_roles.contains(&role)))
    }
}

/// Route table entry for `path`; the message is the route description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    pub path: String,
}

#[async_trait]
impl Guard for RouteGuard {
    fn title(&self) -> &str {
        INSUFFICIENT_PERMISSIONS
    }

    fn default_message(&self, resolver: &PermissionResolver) -> String {
        route_description(resolver.routes(), &self.path).to_string()
    }

    async fn determine(&self, resolver: &PermissionResolver) -> Determination {
        let role = resolver.current_role();
        Determination::Resolved(resolver.check_route(&self.path, role.as_ref()).await)
    }
}

/// Latest determination for one guarded region.
///
/// Whichever determination resolves last is what the slot holds, regardless
/// of the order the requests were issued in.
#[derive(Debug)]
pub struct GuardSlot {
    current: Mutex<Determination>,
}

impl Default for GuardSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardSlot {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Determination::Pending),
        }
    }

    pub fn current(&self) -> Determination {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, determination: Determination) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = determination;
    }

    /// Resolve `guard` and store the result.
    pub async fn resolve<G>(&self, guard: &G, resolver: &PermissionResolver) -> Determination
    where
        G: Guard + ?Sized,
    {
        let determination = guard.determine(resolver).await;
        self.set(determination);
        determination
    }
}
