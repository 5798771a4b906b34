//! Account and company status enums.

use serde::{Deserialize, Serialize};

/// Account status.
///
/// The only automatic transition is `ActivationPending → Active` (email
/// confirmation); there are no other transitions once active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Created, waiting for email confirmation. Cannot authenticate.
    #[default]
    ActivationPending,
    /// Confirmed and able to authenticate/transact.
    Active,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::ActivationPending => write!(f, "ACTIVATION_PENDING"),
            AccountStatus::Active => write!(f, "ACTIVE"),
        }
    }
}

/// Company status. Companies are a tenant boundary, not part of the
/// session lifecycle; their status is managed by admin CRUD only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyStatus {
    #[default]
    ActivationPending,
    Active,
}

impl core::fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CompanyStatus::ActivationPending => write!(f, "ACTIVATION_PENDING"),
            CompanyStatus::Active => write!(f, "ACTIVE"),
        }
    }
}
