//! Token issuance and verification.
//!
//! Three independent HS256 signing contexts (access, refresh, confirmation),
//! each with its own secret and expiry, so that compromise of one token class
//! cannot be used to forge the others.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use gatehouse_core::{Account, AuthError, AuthResult};

use crate::claims::{AccessClaims, ConfirmationClaims};

/// Secrets and expiries for the three signing contexts
/// (environment-sourced; loaded once at startup).
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_secret: String,
    pub refresh_ttl_secs: i64,
    pub confirmation_secret: String,
    pub confirmation_ttl_secs: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

struct SigningContext {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl SigningContext {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    fn issue<T: Serialize>(&self, claims: &T) -> AuthResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| AuthError::storage("token_sign"))
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> AuthResult<T> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::BadToken,
            })
    }
}

pub struct TokenIssuer {
    access: SigningContext,
    refresh: SigningContext,
    confirmation: SigningContext,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access: SigningContext::new(&config.access_secret, config.access_ttl_secs),
            refresh: SigningContext::new(&config.refresh_secret, config.refresh_ttl_secs),
            confirmation: SigningContext::new(
                &config.confirmation_secret,
                config.confirmation_ttl_secs,
            ),
        }
    }

    /// Issue an access+refresh pair carrying the account snapshot.
    pub fn issue_pair(&self, account: &Account, now: DateTime<Utc>) -> AuthResult<TokenPair> {
        let access_claims = AccessClaims::snapshot(account, now, self.access.ttl_secs);
        let refresh_claims = AccessClaims::snapshot(account, now, self.refresh.ttl_secs);
        Ok(TokenPair {
            token: self.access.issue(&access_claims)?,
            refresh_token: self.refresh.issue(&refresh_claims)?,
        })
    }

    pub fn issue_confirmation(&self, email: &str, now: DateTime<Utc>) -> AuthResult<String> {
        let claims = ConfirmationClaims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.confirmation.ttl_secs,
        };
        self.confirmation.issue(&claims)
    }

    pub fn verify_access(&self, token: &str) -> AuthResult<AccessClaims> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> AuthResult<AccessClaims> {
        self.refresh.verify(token)
    }

    pub fn verify_confirmation(&self, token: &str) -> AuthResult<ConfirmationClaims> {
        self.confirmation.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_core::{AccountStatus, NewAccount, Role};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&TokenConfig {
            access_secret: "access-secret".to_string(),
            access_ttl_secs: 300,
            refresh_secret: "refresh-secret".to_string(),
            refresh_ttl_secs: 86_400,
            confirmation_secret: "confirmation-secret".to_string(),
            confirmation_ttl_secs: 3_600,
        })
    }

    fn account() -> Account {
        let mut account = Account::new(
            NewAccount {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                company: None,
                roles: vec![Role::CONTENT_ADMIN],
            },
            "hash".to_string(),
            Utc::now(),
        );
        account.status = AccountStatus::Active;
        account
    }

    #[test]
    fn pair_round_trips_the_snapshot() {
        let issuer = issuer();
        let account = account();
        let pair = issuer.issue_pair(&account, Utc::now()).unwrap();

        let claims = issuer.verify_access(&pair.token).unwrap();
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.roles, vec![Role::CONTENT_ADMIN]);
        assert_eq!(claims.status, AccountStatus::Active);

        let refresh_claims = issuer.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh_claims.sub, account.id);
    }

    #[test]
    fn contexts_are_isolated() {
        let issuer = issuer();
        let pair = issuer.issue_pair(&account(), Utc::now()).unwrap();

        // An access token is not a refresh token and vice versa.
        assert_eq!(
            issuer.verify_refresh(&pair.token).unwrap_err(),
            gatehouse_core::AuthError::BadToken
        );
        assert_eq!(
            issuer.verify_access(&pair.refresh_token).unwrap_err(),
            gatehouse_core::AuthError::BadToken
        );

        // Neither verifies as a confirmation token.
        assert_eq!(
            issuer.verify_confirmation(&pair.token).unwrap_err(),
            gatehouse_core::AuthError::BadToken
        );
    }

    #[test]
    fn expired_is_distinguished_from_bad() {
        let expired_issuer = TokenIssuer::new(&TokenConfig {
            access_secret: "access-secret".to_string(),
            access_ttl_secs: -120,
            refresh_secret: "refresh-secret".to_string(),
            refresh_ttl_secs: -120,
            confirmation_secret: "confirmation-secret".to_string(),
            confirmation_ttl_secs: -120,
        });

        let token = expired_issuer
            .issue_confirmation("a@x.com", Utc::now())
            .unwrap();
        assert_eq!(
            expired_issuer.verify_confirmation(&token).unwrap_err(),
            gatehouse_core::AuthError::TokenExpired
        );

        assert_eq!(
            expired_issuer
                .verify_confirmation("not-a-token")
                .unwrap_err(),
            gatehouse_core::AuthError::BadToken
        );
    }

    #[test]
    fn confirmation_claims_carry_only_the_email() {
        let issuer = issuer();
        let token = issuer.issue_confirmation("a@x.com", Utc::now()).unwrap();
        let claims = issuer.verify_confirmation(&token).unwrap();
        assert_eq!(claims.email, "a@x.com");
    }
}
