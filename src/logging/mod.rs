//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Human-readable console output
//! - Optional JSON file output with rotation
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use nmdose::logging::init_logging;
//! use nmdose::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(category = "PT", "Query dispatched");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a batch run phase transition
///
/// # Example
///
/// ```no_run
/// use nmdose::log_phase;
///
/// let run_id = uuid::Uuid::new_v4();
/// log_phase!(run_id, "WINDOW_COMPUTED");
/// log_phase!(run_id, "QUERY_DISPATCHED", category = "PT");
/// ```
#[macro_export]
macro_rules! log_phase {
    ($run_id:expr, $phase:expr) => {
        tracing::info!(run_id = %$run_id, phase = $phase, "Run phase");
    };
    ($run_id:expr, $phase:expr, $($field:tt)+) => {
        tracing::info!(run_id = %$run_id, phase = $phase, $($field)+, "Run phase");
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use nmdose::log_error_with_context;
/// use nmdose::domain::NmdoseError;
///
/// let error = NmdoseError::Database("connection refused".to_string());
/// log_error_with_context!(&error, "Failed to record query audit event");
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
