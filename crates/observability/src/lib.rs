//! Shared tracing/logging setup for the gatehouse binaries.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing: JSON lines on stdout, filtered via
/// `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls become no-ops, which also
/// lets integration tests spawn servers without fighting over the global
/// subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
