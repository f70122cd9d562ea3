//! Diagnostic logging for the CLI
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber. Filtering follows `MAILMATCH_LOG` (`RUST_LOG` syntax), falling
//! back to the level passed in.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "MAILMATCH_LOG";

/// Install a stderr subscriber
///
/// Calling this more than once is harmless; later calls report the failure
/// on stderr and keep the first subscriber.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if let Err(e) = subscriber.try_init() {
        eprintln!("Failed to init tracing subscriber: {e}");
    }
}
