//! Shared helpers for the integration tests.

/// Installs a test-friendly tracing subscriber. Safe to call from every
/// test; only the first call wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}
