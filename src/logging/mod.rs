//! Logging and observability
//!
//! Structured logging via `tracing` with:
//! - Configurable log levels (`RUST_LOG` wins when set)
//! - Console output on stderr
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use nhsfilter::logging::init_logging;
//! use nhsfilter::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an input file that was left alone
///
/// # Example
///
/// ```no_run
/// use nhsfilter::log_file_skipped;
/// use std::path::Path;
///
/// log_file_skipped!(Path::new("visits.csv"), "permission denied");
/// ```
#[macro_export]
macro_rules! log_file_skipped {
    ($path:expr, $reason:expr) => {
        tracing::warn!(
            path = %$path.display(),
            reason = %$reason,
            "Skipping file"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use nhsfilter::log_error_with_context;
/// use nhsfilter::domain::FilterError;
///
/// let error = FilterError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
