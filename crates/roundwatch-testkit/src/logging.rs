//! Test log output

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init();
});

/// Install a `tracing` subscriber for tests.
///
/// Honors `RUST_LOG` and defaults to `warn`. Safe to call from every test;
/// only the first call in a process installs anything.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
