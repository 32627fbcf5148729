use serde::Serialize;
use thiserror::Error;

use crate::{PermissionFlag, PermissionSet, Role};

/// Borrowed view of what a rule demands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Requirement<'a> {
    pub permissions: &'a [PermissionFlag],
    /// `true`: every flag must be granted; `false`: any one suffices.
    pub require_all: bool,
    pub roles: &'a [&'a str],
}

impl Requirement<'_> {
    /// A requirement with no role gate and no flags (always satisfied).
    pub const OPEN: Requirement<'static> = Requirement {
        permissions: &[],
        require_all: false,
        roles: &[],
    };
}

/// Implemented by every declarative rule shape (routes, menus).
pub trait RuleRequirement {
    /// Identifier used in explanations (path or menu key).
    fn rule_key(&self) -> &str;

    fn requirement(&self) -> Requirement<'_>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("role '{}' is not allowed (allowed: {})", .role.as_deref().unwrap_or("<none>"), .allowed.join(", "))]
    RoleNotAllowed {
        role: Option<String>,
        allowed: Vec<String>,
    },

    #[error("missing {} of: {}", combinator(.require_all), flags_list(.required))]
    MissingPermissions {
        required: Vec<PermissionFlag>,
        require_all: bool,
    },
}

fn combinator(require_all: &bool) -> &'static str {
    if *require_all { "all" } else { "any" }
}

fn flags_list(flags: &[PermissionFlag]) -> String {
    flags.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
}

/// Check a requirement against a permission set and role.
///
/// - No IO
/// - No panics
/// - Role gate first, then the flag combinator
pub fn authorize(
    requirement: &Requirement<'_>,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> Result<(), AuthzError> {
    if !requirement.roles.is_empty() {
        let listed = role.is_some_and(|r| requirement.roles.contains(&r.as_str()));
        if !listed {
            return Err(AuthzError::RoleNotAllowed {
                role: role.map(|r| r.as_str().to_string()),
                allowed: requirement.roles.iter().map(|r| r.to_string()).collect(),
            });
        }
    }

    if !requirement.permissions.is_empty() {
        let granted = if requirement.require_all {
            permissions.has_all_permissions(requirement.permissions)
        } else {
            permissions.has_any_permission(requirement.permissions)
        };

        if !granted {
            return Err(AuthzError::MissingPermissions {
                required: requirement.permissions.to_vec(),
                require_all: requirement.require_all,
            });
        }
    }

    Ok(())
}

/// Evaluate an optional matched rule. No rule means allow.
pub(crate) fn evaluate_rule<R: RuleRequirement>(
    rule: Option<&R>,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> bool {
    match rule {
        None => true,
        Some(rule) => authorize(&rule.requirement(), permissions, role).is_ok(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a route or menu entry was allowed or denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleExplanation {
    /// The path or menu key that was evaluated.
    pub target: String,

    /// Key of the rule that matched, if any.
    pub matched_rule: Option<String>,

    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Populated when denied.
    pub denial: Option<DenialReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    RoleNotAllowed,
    MissingPermission,
}

pub(crate) fn explain_rule<R: RuleRequirement>(
    target: &str,
    rule: Option<&R>,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> RuleExplanation {
    let Some(rule) = rule else {
        return RuleExplanation {
            target: target.to_string(),
            matched_rule: None,
            granted: true,
            reason: format!("No rule matches '{target}'; unlisted targets are allowed"),
            denial: None,
        };
    };

    let matched_rule = Some(rule.rule_key().to_string());
    match authorize(&rule.requirement(), permissions, role) {
        Ok(()) => RuleExplanation {
            target: target.to_string(),
            matched_rule,
            granted: true,
            reason: format!("Rule '{}' is satisfied", rule.rule_key()),
            denial: None,
        },
        Err(err) => {
            let denial = match &err {
                AuthzError::RoleNotAllowed { allowed, .. } => DenialReason {
                    kind: DenialKind::RoleNotAllowed,
                    message: err.to_string(),
                    suggestions: allowed
                        .iter()
                        .map(|r| format!("Sign in with the '{r}' role"))
                        .collect(),
                },
                AuthzError::MissingPermissions { required, require_all } => {
                    let missing: Vec<_> = required
                        .iter()
                        .filter(|f| !permissions.has_permission(**f))
                        .collect();
                    let suggestions = if *require_all {
                        missing.iter().map(|f| format!("Grant '{f}'")).collect()
                    } else {
                        vec![format!("Grant any one of: {}", flags_list(required))]
                    };
                    DenialReason {
                        kind: DenialKind::MissingPermission,
                        message: err.to_string(),
                        suggestions,
                    }
                }
            };

            RuleExplanation {
                target: target.to_string(),
                matched_rule,
                granted: false,
                reason: format!("Rule '{}' denies access: {err}", rule.rule_key()),
                denial: Some(denial),
            }
        }
    }
}
