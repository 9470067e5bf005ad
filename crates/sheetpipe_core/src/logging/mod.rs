//! Logging infrastructure for sheetpipe.
//!
//! This module provides:
//! - Per-job loggers with file + callback dual output
//! - Compact mode that filters external tool chatter
//! - Tail buffer used to attach tool diagnostics to stage failures
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use sheetpipe_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("chopin_op28", ".logs", LogConfig::default(), None).unwrap();
//! logger.phase("Recognize");
//! logger.command("audiveris -batch chopin_op28.pdf ...");
//! logger.success("Recognize completed");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(level_to_filter_str(LogLevel::Debug), "debug");
        assert_eq!(level_to_filter_str(LogLevel::Info), "info");
    }
}
