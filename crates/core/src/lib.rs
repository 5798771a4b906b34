//! `gatehouse-core` — pure domain types for the authentication backend.
//!
//! This crate contains **pure domain** primitives (no HTTP, storage, or mail
//! concerns): identifiers, account/company records with explicit factories,
//! the error taxonomy, and boundary input validation.

pub mod account;
pub mod company;
pub mod error;
pub mod id;
pub mod role;
pub mod status;
pub mod validation;

pub use account::{Account, NewAccount};
pub use company::{Company, NewCompany};
pub use error::{AuthError, AuthResult};
pub use id::{AccountId, CompanyId};
pub use role::Role;
pub use status::{AccountStatus, CompanyStatus};
pub use validation::FieldError;
