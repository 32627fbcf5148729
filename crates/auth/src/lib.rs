//! `entbridge-auth` — pure permission evaluation boundary.
//!
//! No HTTP and no storage in here: every decision is a deterministic function
//! of the rule table, the target, the permission set and the role.

pub mod authorize;
pub mod menus;
pub mod permissions;
pub mod roles;
pub mod routes;

pub use authorize::{
    authorize, AuthzError, DenialKind, DenialReason, Requirement, RuleExplanation,
    RuleRequirement,
};
pub use menus::{
    check_menu_permission, explain_menu, filter_accessible_menus, find_menu_rule, MenuItem,
    MenuPermissionRule, MENU_PERMISSIONS,
};
pub use permissions::{PermissionFlag, PermissionSet};
pub use roles::Role;
pub use routes::{
    accessible_routes, check_route_permission, explain_route, find_route_rule, route_description,
    route_fallback, RoutePermissionRule, DEFAULT_ROUTE_DESCRIPTION, ROUTE_PERMISSIONS,
};
