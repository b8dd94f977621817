//! Tracing subscriber setup for the `filevault` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "FILEVAULT_LOG";

/// Install a compact stderr subscriber.
///
/// `FILEVAULT_LOG` wins over `fallback`; an unparsable fallback drops
/// back to `warn`.  Stdout stays reserved for command output.
pub fn init(fallback: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) is harmless; ignore it.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .try_init();
}
