//! Environment-sourced configuration, loaded once at startup.

use gatehouse_auth::TokenConfig;

/// Process configuration. Missing secrets fall back to insecure dev defaults
/// with a warning; production deployments are expected to set all of them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub access_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_secret: String,
    pub refresh_ttl_secs: i64,
    pub confirmation_secret: String,
    pub confirmation_ttl_secs: i64,
    pub bcrypt_cost: u32,
    /// Base URL the confirmation link points at; the token rides as a query
    /// parameter.
    pub confirmation_url: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            access_secret: secret("JWT_ACCESS_SECRET", "dev-access-secret"),
            access_ttl_secs: int("JWT_ACCESS_TTL_SECS", 900),
            refresh_secret: secret("JWT_REFRESH_SECRET", "dev-refresh-secret"),
            refresh_ttl_secs: int("JWT_REFRESH_TTL_SECS", 7 * 86_400),
            confirmation_secret: secret("JWT_CONFIRM_SECRET", "dev-confirm-secret"),
            confirmation_ttl_secs: int("JWT_CONFIRM_TTL_SECS", 86_400),
            bcrypt_cost: int("BCRYPT_COST", 12u32),
            confirmation_url: std::env::var("CONFIRMATION_URL")
                .unwrap_or_else(|_| "http://localhost:8080/auth/confirm".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.access_secret.clone(),
            access_ttl_secs: self.access_ttl_secs,
            refresh_secret: self.refresh_secret.clone(),
            refresh_ttl_secs: self.refresh_ttl_secs,
            confirmation_secret: self.confirmation_secret.clone(),
            confirmation_ttl_secs: self.confirmation_ttl_secs,
        }
    }
}

fn secret(name: &str, dev_default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{name} not set; using insecure dev default");
        dev_default.to_string()
    })
}

fn int<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(name) {
        Ok(raw) => parse_int(&raw, name, default),
        Err(_) => default,
    }
}

fn parse_int<T>(raw: &str, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!("{name} is not a valid integer; using default {default}");
        default
    })
}
