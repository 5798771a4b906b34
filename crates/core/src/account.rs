//! Account record: identity + credential + status.
//!
//! # Invariants
//! - `status` transitions only along `ActivationPending → Active`.
//! - `refresh_token_hash` is set only by a successful login or refresh and
//!   cleared only by logout.
//! - Accounts are never hard-deleted by the lifecycle (deletion is an admin
//!   CRUD concern).

use chrono::{DateTime, Utc};

use crate::id::{AccountId, CompanyId};
use crate::role::Role;
use crate::status::AccountStatus;

/// One record per account. The password is stored hashed only; the refresh
/// token is represented server-side solely by its fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Absent for top-level admins; every other account belongs to exactly
    /// one company.
    pub company: Option<CompanyId>,
    pub roles: Vec<Role>,
    pub status: AccountStatus,
    pub password_changed: bool,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub company: Option<CompanyId>,
    pub roles: Vec<Role>,
}

impl Account {
    /// Factory applying creation defaults: `ActivationPending` status, no
    /// refresh session, `password_changed = false`.
    pub fn new(profile: NewAccount, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            username: profile.username,
            email: profile.email.trim().to_lowercase(),
            password_hash,
            company: profile.company,
            roles: profile.roles,
            status: AccountStatus::ActivationPending,
            password_changed: false,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
