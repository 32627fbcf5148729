//! Sidebar menu permission tree.
//!
//! Menu rules are keyed by menu identifier and nest like the menu itself.
//! Lookup walks the rule tree depth-first (node before children, declaration
//! order) and takes the first key match. Unmatched keys are shown.

use serde::{Deserialize, Serialize};

use crate::authorize::{evaluate_rule, explain_rule, Requirement, RuleExplanation, RuleRequirement};
use crate::PermissionFlag::{CanAccessSystem, CanChat, CanManageKnowledge, CanManageUsers};
use crate::{PermissionFlag, PermissionSet, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuPermissionRule {
    pub key: &'static str,
    pub required_permissions: &'static [PermissionFlag],
    pub require_all: bool,
    pub roles: &'static [&'static str],
    pub children: &'static [MenuPermissionRule],
}

impl MenuPermissionRule {
    pub const fn any_of(key: &'static str, flags: &'static [PermissionFlag]) -> Self {
        Self {
            key,
            required_permissions: flags,
            require_all: false,
            roles: &[],
            children: &[],
        }
    }

    pub const fn with_children(mut self, children: &'static [MenuPermissionRule]) -> Self {
        self.children = children;
        self
    }
}

impl RuleRequirement for MenuPermissionRule {
    fn rule_key(&self) -> &str {
        self.key
    }

    fn requirement(&self) -> Requirement<'_> {
        Requirement {
            permissions: self.required_permissions,
            require_all: self.require_all,
            roles: self.roles,
        }
    }
}

/// Sidebar menu rules.
pub static MENU_PERMISSIONS: &[MenuPermissionRule] = &[
    MenuPermissionRule::any_of("knowledge", &[CanManageKnowledge]).with_children(&[
        MenuPermissionRule::any_of("dataset", &[CanManageKnowledge]),
        MenuPermissionRule::any_of("chunk", &[CanManageKnowledge]),
    ]),
    MenuPermissionRule::any_of("chat", &[CanChat]),
    MenuPermissionRule::any_of("conversation", &[CanChat]),
    MenuPermissionRule::any_of("flow", &[CanAccessSystem]),
    MenuPermissionRule::any_of("file-manager", &[CanManageKnowledge, CanAccessSystem]),
    MenuPermissionRule::any_of("user-setting", &[CanManageUsers]),
    MenuPermissionRule::any_of("team", &[CanManageUsers]),
    MenuPermissionRule::any_of("setting", &[CanAccessSystem]),
];

/// Menu entry supplied by the caller and filtered by [`filter_accessible_menus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }
}

/// Depth-first search of the rule tree for `key`.
pub fn find_menu_rule<'r>(
    rules: &'r [MenuPermissionRule],
    key: &str,
) -> Option<&'r MenuPermissionRule> {
    for rule in rules {
        if rule.key == key {
            return Some(rule);
        }
        if let Some(found) = find_menu_rule(rule.children, key) {
            return Some(found);
        }
    }
    None
}

/// Whether the menu entry `key` should be shown. Unmatched keys are shown.
pub fn check_menu_permission(
    rules: &[MenuPermissionRule],
    key: &str,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> bool {
    evaluate_rule(find_menu_rule(rules, key), permissions, role)
}

pub fn explain_menu(
    rules: &[MenuPermissionRule],
    key: &str,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> RuleExplanation {
    explain_rule(key, find_menu_rule(rules, key), permissions, role)
}

/// Drop every entry whose own rule denies, recursing into the children of
/// the entries that remain.
pub fn filter_accessible_menus(
    rules: &[MenuPermissionRule],
    menus: Vec<MenuItem>,
    permissions: &PermissionSet,
    role: Option<&Role>,
) -> Vec<MenuItem> {
    menus
        .into_iter()
        .filter(|menu| check_menu_permission(rules, &menu.key, permissions, role))
        .map(|mut menu| {
            let children = std::mem::take(&mut menu.children);
            menu.children = filter_accessible_menus(rules, children, permissions, role);
            menu
        })
        .collect()
}
