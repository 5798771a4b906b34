//! `gatehouse-auth` — authentication/session lifecycle.
//!
//! This crate is decoupled from HTTP: collaborators (credential store, token
//! issuer, password hasher, notifier) are passed in explicitly, and the
//! access-control gate is a pair of pure functions composed per route by the
//! API layer.

pub mod claims;
pub mod gate;
pub mod password;
pub mod provisioning;
pub mod session;
pub mod tokens;

pub use claims::{AccessClaims, ConfirmationClaims};
pub use gate::{authenticate, authorize};
pub use password::{PasswordHasher, generate_temporary_password, refresh_fingerprint};
pub use provisioning::{NewAdmin, NewUser, ProvisioningService};
pub use session::SessionService;
pub use tokens::{TokenConfig, TokenIssuer, TokenPair};
