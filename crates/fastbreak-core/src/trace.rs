//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, filtered by `FASTBREAK_LOG`
/// (defaults to `info`). Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("FASTBREAK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
