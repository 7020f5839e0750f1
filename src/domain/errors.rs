//! Domain error types
//!
//! This module defines the error hierarchy for nmdose. Errors are
//! domain-specific and don't expose third-party types.
//!
//! Expected failures of the external protocol tools are *not* errors: they are
//! carried as [`crate::adapters::dimse::InvocationStatus::Failure`] values and
//! end up in the audit trail. Only failures that must stop a run surface here.

use thiserror::Error;

/// Main nmdose error type
#[derive(Debug, Error)]
pub enum NmdoseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database errors (connection, statement, rejected row)
    #[error("Database error: {0}")]
    Database(String),

    /// Watermark state errors
    #[error("State management error: {0}")]
    State(String),

    /// Parse errors (tags, date ranges)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl NmdoseError {
    /// Whether this error means the persisted store could not be written or read
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, NmdoseError::Database(_) | NmdoseError::State(_))
    }
}

impl From<std::io::Error> for NmdoseError {
    fn from(err: std::io::Error) -> Self {
        NmdoseError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for NmdoseError {
    fn from(err: toml::de::Error) -> Self {
        NmdoseError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio_postgres::Error> for NmdoseError {
    fn from(err: tokio_postgres::Error) -> Self {
        NmdoseError::Database(err.to_string())
    }
}
