//! `gatehouse-store` — persistence boundary for accounts and companies.
//!
//! The lifecycle consumes the [`CredentialStore`]/[`CompanyStore`] traits
//! only. An in-memory implementation backs dev and tests; a Postgres-backed
//! implementation is available behind the `postgres` feature.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use gatehouse_core::{
    Account, AccountId, AccountStatus, AuthError, Company, CompanyId, CompanyStatus, Role,
};

/// Store-layer error. Translated into the lifecycle taxonomy at the boundary:
/// unique-key clashes become `Duplicate`, everything else an opaque
/// `Storage` code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicated value for unique field `{field}`")]
    Duplicate { field: &'static str },

    #[error("storage backend failure (code {code})")]
    Backend { code: String },
}

impl StoreError {
    pub fn backend(code: impl Into<String>) -> Self {
        Self::Backend { code: code.into() }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => AuthError::Duplicate,
            StoreError::Backend { code } => AuthError::Storage { code },
        }
    }
}

/// Partial account record for field-level updates.
///
/// `refresh_token_hash` is doubly optional: `None` leaves the field alone,
/// `Some(None)` clears it (logout), `Some(Some(_))` replaces it.
#[derive(Debug, Default, Clone)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub roles: Option<Vec<Role>>,
    pub status: Option<AccountStatus>,
    pub password_hash: Option<String>,
    pub password_changed: Option<bool>,
    pub refresh_token_hash: Option<Option<String>>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.roles.is_none()
            && self.status.is_none()
            && self.password_hash.is_none()
            && self.password_changed.is_none()
            && self.refresh_token_hash.is_none()
    }
}

/// Partial company record for field-level updates.
#[derive(Debug, Default, Clone)]
pub struct CompanyPatch {
    pub kind: Option<String>,
    pub tax_id_kind: Option<String>,
    pub tax_id: Option<String>,
    pub full_name: Option<String>,
    pub short_name: Option<String>,
    pub status: Option<CompanyStatus>,
}

/// Persistence contract for account records.
///
/// Single-record operations are atomic in the backend;
/// [`swap_refresh_token_hash`](CredentialStore::swap_refresh_token_hash) is
/// the compare-and-swap used to rotate refresh tokens without a window for
/// concurrent rotations to both win.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create(&self, account: Account) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_id_and_company(
        &self,
        id: AccountId,
        company: CompanyId,
    ) -> Result<Option<Account>, StoreError>;

    async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Account>, StoreError>;

    /// Apply a partial update; returns the updated record, or `None` when the
    /// account does not exist.
    async fn update_fields(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError>;

    /// Company-scoped variant of [`update_fields`](CredentialStore::update_fields)
    /// for admin CRUD.
    async fn update_in_company(
        &self,
        id: AccountId,
        company: CompanyId,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError>;

    /// Replace the stored refresh-token hash only if it currently equals
    /// `expected`. Returns whether the swap happened.
    async fn swap_refresh_token_hash(
        &self,
        id: AccountId,
        expected: Option<&str>,
        new: Option<String>,
    ) -> Result<bool, StoreError>;

    /// Company-scoped delete; returns whether a record was removed.
    async fn delete_in_company(
        &self,
        id: AccountId,
        company: CompanyId,
    ) -> Result<bool, StoreError>;
}

/// Persistence contract for company records.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn create(&self, company: Company) -> Result<Company, StoreError>;

    async fn find_all(&self) -> Result<Vec<Company>, StoreError>;

    async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError>;

    async fn update_fields(
        &self,
        id: CompanyId,
        patch: CompanyPatch,
    ) -> Result<Option<Company>, StoreError>;

    async fn delete(&self, id: CompanyId) -> Result<bool, StoreError>;
}
