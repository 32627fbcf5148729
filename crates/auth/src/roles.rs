use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used by role-gated rules.
///
/// Roles are opaque strings; the rule tables only know `admin` and `normal`,
/// but any value the identity system hands out is accepted and simply fails
/// to match a rule that does not list it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role::from_static("admin");
    pub const NORMAL: Role = Role::from_static("normal");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Usable in `const` rule tables.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
