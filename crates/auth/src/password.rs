//! Password hashing and refresh-token fingerprinting.

use rand::Rng;
use rand::seq::SliceRandom;
use sha2::{Digest, Sha256};

use gatehouse_core::{AuthError, AuthResult};

/// bcrypt wrapper with a configurable cost factor (environment-sourced;
/// tests use a low cost for speed).
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plain: &str) -> AuthResult<String> {
        bcrypt::hash(plain, self.cost).map_err(|_| AuthError::storage("password_hash"))
    }

    /// Constant result on malformed hashes: verification simply fails.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        bcrypt::verify(plain, hash).unwrap_or(false)
    }
}

/// Server-side fingerprint of a refresh token.
///
/// SHA-256 rather than bcrypt: bcrypt truncates input at 72 bytes, and two
/// JWTs for the same account share their first 72 bytes (constant header plus
/// the leading claim fields), which would make rotation a no-op.
pub fn refresh_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnpqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";

/// Generate a random temporary password that satisfies the password policy
/// (12 chars, mixed case, digits). Transmitted once over the notifier
/// channel, never persisted in cleartext.
pub fn generate_temporary_password() -> String {
    let mut rng = rand::thread_rng();
    let mut chars: Vec<u8> = Vec::with_capacity(12);

    // Two from each class guarantees the policy, the rest is drawn from all.
    for set in [UPPER, LOWER, DIGITS] {
        for _ in 0..2 {
            chars.push(set[rng.gen_range(0..set.len())]);
        }
    }
    let all: Vec<u8> = [UPPER, LOWER, DIGITS].concat();
    for _ in 0..6 {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    String::from_utf8(chars).expect("charset is ascii")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("Admin123").unwrap();
        assert!(hasher.verify("Admin123", &hash));
        assert!(!hasher.verify("Admin124", &hash));
    }

    #[test]
    fn verify_tolerates_malformed_hashes() {
        let hasher = PasswordHasher::new(4);
        assert!(!hasher.verify("Admin123", "not-a-bcrypt-hash"));
    }

    #[test]
    fn fingerprint_is_deterministic_and_distinguishing() {
        let a = refresh_fingerprint("token-a");
        assert_eq!(a, refresh_fingerprint("token-a"));
        assert_ne!(a, refresh_fingerprint("token-b"));
    }

    #[test]
    fn fingerprints_differ_beyond_a_shared_prefix() {
        // The motivating case for SHA-256 over bcrypt: long inputs that agree
        // on their first 72 bytes must still be told apart.
        let prefix = "x".repeat(100);
        assert_ne!(
            refresh_fingerprint(&format!("{prefix}1")),
            refresh_fingerprint(&format!("{prefix}2"))
        );
    }

    #[test]
    fn temporary_passwords_satisfy_the_policy() {
        for _ in 0..50 {
            let password = generate_temporary_password();
            assert!(
                gatehouse_core::validation::password("password", &password).is_ok(),
                "generated password violated policy: {password}"
            );
        }
    }
}
