//! Diagnostics setup
//!
//! Logs go to stderr so they never mix with CSV on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug`
pub const LOG_ENV: &str = "JACOCO2CSV_LOG";

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
