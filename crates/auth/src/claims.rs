//! Signed token claim models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::{Account, AccountId, AccountStatus, CompanyId, Role};

/// Claims carried by access and refresh tokens.
///
/// This is a **snapshot** of the account profile at issuance time: role or
/// status changes after issuance are not reflected until the token is
/// refreshed or re-issued. That staleness is a deliberate trust/performance
/// tradeoff, not a bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the account id.
    pub sub: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub company: Option<CompanyId>,
    pub roles: Vec<Role>,
    pub status: AccountStatus,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Unique token id; makes every issuance distinct so rotation always
    /// produces a new refresh-token fingerprint.
    pub jti: Uuid,
}

impl AccessClaims {
    pub fn snapshot(account: &Account, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        Self {
            sub: account.id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            company: account.company,
            roles: account.roles.clone(),
            status: account.status,
            iat: issued_at.timestamp(),
            exp: issued_at.timestamp() + ttl_secs,
            jti: Uuid::now_v7(),
        }
    }
}

/// Claims carried by the out-of-band email-confirmation token: the email
/// only. Single semantic use — confirming exactly one pending account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}
