//! Error taxonomy for the authentication/session lifecycle.
//!
//! Every failure is a typed, user-facing kind plus a human-readable message.
//! Storage failures are translated at the store boundary; raw backend errors
//! never cross into this enum beyond an opaque code.

use thiserror::Error;

use crate::status::AccountStatus;

/// Result type used across the lifecycle layer.
pub type AuthResult<T> = Result<T, AuthError>;

/// Lifecycle/API error.
///
/// `InvalidCredentials` is deliberately shared between "unknown email" and
/// "wrong password" to resist account enumeration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("email or password are invalid")]
    InvalidCredentials,

    #[error("account must be active (status is {status})")]
    AccountNotActive { status: AccountStatus },

    #[error("account not found")]
    AccountNotFound,

    #[error("bad token")]
    BadToken,

    #[error("token expired")]
    TokenExpired,

    #[error("account status does not allow this operation")]
    InvalidState,

    #[error("new password cannot be the same as the current one")]
    PasswordReused,

    #[error("access denied")]
    AccessDenied,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("duplicated value for a unique field")]
    Duplicate,

    #[error("storage error (code {code})")]
    Storage { code: String },
}

impl AuthError {
    /// Stable machine-checkable kind, used as the `error` code in responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountNotActive { .. } => "account_not_active",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::BadToken => "bad_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidState => "invalid_state",
            AuthError::PasswordReused => "password_reused",
            AuthError::AccessDenied => "access_denied",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Forbidden => "forbidden",
            AuthError::Duplicate => "duplicate",
            AuthError::Storage { .. } => "storage_error",
        }
    }

    pub fn storage(code: impl Into<String>) -> Self {
        Self::Storage { code: code.into() }
    }
}
