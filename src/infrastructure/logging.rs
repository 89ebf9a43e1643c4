//! Logging configuration
//!
//! Initializes tracing for the application. Logs go to stderr so they never
//! mix with the delegated tools' stdout.

/// Initializes logging with the specified level.
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is a
/// no-op.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging() {
        // Just verify it doesn't panic, even twice
        init_logging("debug");
        init_logging("not a valid [directive");
    }
}
