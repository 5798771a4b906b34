//! Access gate: two pure functions composed per route by the API layer.
//!
//! `authenticate` turns a bearer token into verified claims; `authorize`
//! intersects the claims' roles against the set a route accepts. Both operate
//! on the claim snapshot — the store is deliberately not consulted again.

use gatehouse_core::{AccountStatus, AuthError, AuthResult, Role};

use crate::claims::AccessClaims;
use crate::tokens::TokenIssuer;

/// Verify an access token and check the account snapshot is usable.
///
/// Any verification failure (bad signature, expired, malformed) collapses to
/// `Unauthorized`: the gate never tells an unauthenticated caller why. A
/// token minted for a non-active account is rejected too; a status change
/// after issuance is only seen once the token is re-issued.
pub fn authenticate(issuer: &TokenIssuer, token: &str) -> AuthResult<AccessClaims> {
    let claims = issuer
        .verify_access(token)
        .map_err(|_| AuthError::Unauthorized)?;
    if claims.status != AccountStatus::Active {
        return Err(AuthError::Unauthorized);
    }
    Ok(claims)
}

/// Check the claims carry at least one of the roles a route accepts.
///
/// An empty `allowed` set means the route takes any authenticated caller.
pub fn authorize(claims: &AccessClaims, allowed: &[Role]) -> AuthResult<()> {
    if allowed.is_empty() {
        return Ok(());
    }
    if claims.roles.iter().any(|role| allowed.contains(role)) {
        return Ok(());
    }
    Err(AuthError::Forbidden)
}
