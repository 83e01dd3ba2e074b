//! Logging infrastructure.
//!
//! This module provides:
//! - Per-job loggers with file + callback output
//! - Compact mode with progress filtering
//! - Tail buffer of tool output for failure diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use montage_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("3f2a", ".logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Plan");
//! logger.command("ffmpeg", &["-version".to_string()]);
//! logger.progress(3, 10);
//! logger.success("Output video created");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` and falls back to `default_level`. Output goes to
/// stderr. Calling it twice is harmless.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

/// Initialize tracing for tests (only logs warnings and above).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
