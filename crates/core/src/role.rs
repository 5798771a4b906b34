//! Role tags used for role-based access control.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier.
///
/// Roles are opaque strings at this layer; routes declare the role sets they
/// accept and the access gate intersects them against token claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Top-level administrator; not bound to any company.
    pub const SUPER_ADMIN: Role = Role(Cow::Borrowed("super_admin"));

    /// Company administrator; manages the users of exactly one company.
    pub const CONTENT_ADMIN: Role = Role(Cow::Borrowed("content_admin"));

    /// Regular company member.
    pub const MEMBER: Role = Role(Cow::Borrowed("member"));

    /// Company member with elevated (non-admin) duties.
    pub const MANAGER: Role = Role(Cow::Borrowed("manager"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Roles an admin may assign when creating or updating a company user.
    /// Admin roles are never assignable through the user CRUD surface.
    pub fn assignable() -> &'static [Role] {
        static ASSIGNABLE: [Role; 2] = [Role::MEMBER, Role::MANAGER];
        &ASSIGNABLE
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
