//! Declarative route permission table.
//!
//! Lookup is first-match in declaration order: a rule matches a path that is
//! equal to its own path or that continues it after a `/`. Unmatched paths are
//! allowed.

use serde::Serialize;

use crate::authorize::{evaluate_rule, explain_rule, Requirement, RuleExplanation, RuleRequirement};
use crate::PermissionFlag::{CanAccessSystem, CanChat, CanManageKnowledge, CanManageUsers};
use crate::{PermissionFlag, PermissionSet, Role};

/// Description returned for paths without a rule or without a description.
pub const DEFAULT_ROUTE_DESCRIPTION: &str = "This feature requires additional permissions";

/// Route entry: path prefix → required flags / roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutePermissionRule {
    pub path: &'static str,
    pub required_permissions: &'static [PermissionFlag],
    /// Defaults to `false` (any one flag suffices).
    pub require_all: bool,
    pub roles: &'static [&'static str],
    /// Where a denied navigation should be sent instead.
    pub fallback_path: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl RoutePermissionRule {
    /// A rule requiring any one of `flags`.
    pub const fn any_of(
        path: &'static str,
        flags: &'static [PermissionFlag],
        description: &'static str,
    ) -> Self {
        Self {
            path,
            required_permissions: flags,
            require_all: false,
            roles: &[],
            fallback_path: None,
            description: Some(description),
        }
    }

    /// Exact match, or prefix followed by the path separator.
    pub fn matches(&self, path: &str) -> bool {
        path == self.path
            || path
                .strip_prefix(self.path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl RuleRequirement for RoutePermissionRule {
    fn rule_key(&self) -> &str {
        self.path
    }

    fn requirement(&self) -> Requirement<'_> {
        Requirement {
            permissions: self.required_permissions,
            require_all: self.require_all,
            roles: self.roles,
        }
    }
}

/// Application route table.
pub static ROUTE_PERMISSIONS: &[RoutePermissionRule] = &[
    // Knowledge base
    RoutePermissionRule::any_of("/knowledge", &[CanManageKnowledge], "Knowledge base management"),
    RoutePermissionRule::any_of("/knowledge/dataset", &[CanManageKnowledge], "Dataset management"),
    RoutePermissionRule::any_of("/knowledge/chunk", &[CanManageKnowledge], "Document chunk management"),
    // Chat
    RoutePermissionRule::any_of("/chat", &[CanChat], "Chat"),
    RoutePermissionRule::any_of("/conversation", &[CanChat], "Conversation management"),
    // User management
    RoutePermissionRule::any_of("/user-setting", &[CanManageUsers], "User management"),
    RoutePermissionRule::any_of("/team", &[CanManageUsers], "Team management"),
    // System
    RoutePermissionRule::any_of("/setting", &[CanAccessSystem], "System settings"),
    RoutePermissionRule::any_of("/flow", &[CanAccessSystem], "Workflow management"),
    RoutePermissionRule::any_of(
        "/file-manager",
        &[CanManageKnowledge, CanAccessSystem],
        "File management",
    ),
    // Admin-only
    RoutePermissionRule {
        path: "/admin",
        required_permissions: &[],
        require_all: false,
        roles: &["admin"],
        fallback_path: None,
        description: Some("Administrator-only features"),
    },
];

/// First rule matching `path`, in declaration order.
pub fn find_route_rule<'r>(
    rules: &'r [RoutePermissionRule],
    path: &str,
) -> Option<&'r RoutePermissionRule> {
    rules.iter().find(|rule| rule.matches(path))
}

/// Whether `path` may be visited. Unmatched paths are allowed.
pub fn check_route_permission(
    rules: &[RoutePermissionRule],
    path: &str,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> bool {
    let allowed = evaluate_rule(find_route_rule(rules, path), permissions, role);
    tracing::trace!(path, allowed, "route permission evaluated");
    allowed
}

/// Paths of every rule the caller may visit, in declaration order.
pub fn accessible_routes(
    rules: &[RoutePermissionRule],
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| check_route_permission(rules, rule.path, permissions, role))
        .map(|rule| rule.path)
        .collect()
}

/// Description of the rule matching `path`, or [`DEFAULT_ROUTE_DESCRIPTION`].
pub fn route_description(rules: &[RoutePermissionRule], path: &str) -> &'static str {
    find_route_rule(rules, path)
        .and_then(|rule| rule.description)
        .unwrap_or(DEFAULT_ROUTE_DESCRIPTION)
}

/// Redirect target for a denied `path`, if its rule declares one.
pub fn route_fallback(rules: &[RoutePermissionRule], path: &str) -> Option<&'static str> {
    find_route_rule(rules, path).and_then(|rule| rule.fallback_path)
}

/// Explain the decision [`check_route_permission`] would make.
pub fn explain_route(
    rules: &[RoutePermissionRule],
    path: &str,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> RuleExplanation {
    explain_rule(path, find_route_rule(rules, path), permissions, role)
}
