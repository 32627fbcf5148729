use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four functional-area flags granted to an enterprise user.
///
/// Serialized with the field names the permissions endpoint uses
/// (e.g. `"can_manage_knowledge"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionFlag {
    CanManageKnowledge,
    CanChat,
    CanManageUsers,
    CanAccessSystem,
}

impl PermissionFlag {
    pub const ALL: [PermissionFlag; 4] = [
        PermissionFlag::CanManageKnowledge,
        PermissionFlag::CanChat,
        PermissionFlag::CanManageUsers,
        PermissionFlag::CanAccessSystem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionFlag::CanManageKnowledge => "can_manage_knowledge",
            PermissionFlag::CanChat => "can_chat",
            PermissionFlag::CanManageUsers => "can_manage_users",
            PermissionFlag::CanAccessSystem => "can_access_system",
        }
    }
}

impl core::fmt::Display for PermissionFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| format!("unknown permission flag: {s}"))
    }
}

/// Fixed four-flag permission record for the current session.
///
/// Never persisted; fetched per query. Missing fields decode as `false`, and
/// [`PermissionSet::default`] (all `false`) is the fail-closed value used
/// whenever the record cannot be fetched.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet {
    #[serde(default)]
    pub can_manage_knowledge: bool,
    #[serde(default)]
    pub can_chat: bool,
    #[serde(default)]
    pub can_manage_users: bool,
    #[serde(default)]
    pub can_access_system: bool,
}

impl PermissionSet {
    /// Every flag granted.
    pub fn all() -> Self {
        Self {
            can_manage_knowledge: true,
            can_chat: true,
            can_manage_users: true,
            can_access_system: true,
        }
    }

    /// Build a set granting exactly `flags`.
    pub fn from_flags(flags: &[PermissionFlag]) -> Self {
        let mut set = Self::default();
        for flag in flags {
            set.set(*flag, true);
        }
        set
    }

    pub fn has_permission(&self, flag: PermissionFlag) -> bool {
        match flag {
            PermissionFlag::CanManageKnowledge => self.can_manage_knowledge,
            PermissionFlag::CanChat => self.can_chat,
            PermissionFlag::CanManageUsers => self.can_manage_users,
            PermissionFlag::CanAccessSystem => self.can_access_system,
        }
    }

    pub fn set(&mut self, flag: PermissionFlag, value: bool) {
        let slot = match flag {
            PermissionFlag::CanManageKnowledge => &mut self.can_manage_knowledge,
            PermissionFlag::CanChat => &mut self.can_chat,
            PermissionFlag::CanManageUsers => &mut self.can_manage_users,
            PermissionFlag::CanAccessSystem => &mut self.can_access_system,
        };
        *slot = value;
    }

    /// `true` when at least one of `flags` is granted (`false` for an empty list).
    pub fn has_any_permission(&self, flags: &[PermissionFlag]) -> bool {
        flags.iter().any(|flag| self.has_permission(*flag))
    }

    /// `true` when every one of `flags` is granted (`true` for an empty list).
    pub fn has_all_permissions(&self, flags: &[PermissionFlag]) -> bool {
        flags.iter().all(|flag| self.has_permission(*flag))
    }

    /// Granted flags in declaration order.
    pub fn granted(&self) -> Vec<PermissionFlag> {
        PermissionFlag::ALL
            .into_iter()
            .filter(|flag| self.has_permission(*flag))
            .collect()
    }
}
