use gatehouse_auth::AccessClaims;
use gatehouse_core::{AccountId, CompanyId};

/// Verified identity for a request that passed the access gate.
///
/// Carries the claim snapshot from the token; handlers never re-fetch the
/// account for authorization decisions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: AccessClaims,
}

impl AuthContext {
    pub fn new(claims: AccessClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &AccessClaims {
        &self.claims
    }

    pub fn account_id(&self) -> AccountId {
        self.claims.sub
    }

    pub fn company(&self) -> Option<CompanyId> {
        self.claims.company
    }
}

/// Verified identity for a request that passed the refresh gate. The raw
/// token rides along because rotation matches it against the stored
/// fingerprint.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    claims: AccessClaims,
    raw_token: String,
}

impl RefreshContext {
    pub fn new(claims: AccessClaims, raw_token: String) -> Self {
        Self { claims, raw_token }
    }

    pub fn account_id(&self) -> AccountId {
        self.claims.sub
    }

    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }
}
