//! Node-wide logging setup: a thin façade over `tracing` +
//! `tracing-subscriber`, initialized once at startup.
//!
//! Call sites elsewhere in the workspace use `tracing::{info, warn, error,
//! debug, trace}` directly with structured fields (`%id`, `?entity`)
//! rather than interpolating values into the message string.

use tracing_subscriber::{fmt, EnvFilter};

/// Failures setting the global tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A global subscriber was already installed (e.g. by a test harness).
    #[error("a global tracing subscriber is already set")]
    AlreadyInitialized,
}

/// Install a process-wide `fmt` subscriber.
///
/// `default_level` sets the filter used when `RUST_LOG` is unset; `RUST_LOG`
/// always takes precedence when present, matching `tracing_subscriber`'s
/// usual convention.
pub fn init(default_level: &str) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|_| Error::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_already_initialized() {
        let _ = init("info");
        assert!(matches!(init("info"), Err(Error::AlreadyInitialized)));
    }
}
