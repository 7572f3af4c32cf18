//! Error types for costctl
//!
//! This module defines the error handling strategy for costctl. There are two
//! error types: `CostctlError` (main error enum) and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostctlError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary using `anyhow::Error::from` to preserve error chains.
//!
//! Note that the analysis engine itself (`src/analysis.rs`) has no error paths:
//! partial telemetry maps to explicit defaults so a single instance with missing
//! fields can never abort the whole report. Errors here cover everything that
//! happens *before* analysis (config, input loading, AWS acquisition) and
//! *after* it (serialization, report output).
//!
//! ## Retry Awareness
//!
//! Errors implement `IsRetryable` to indicate whether an operation should be
//! retried. The backoff policy in `src/retry.rs` uses this to decide between
//! retrying and failing fast. Only `Aws`, `Io`, and `Retryable` variants are
//! retryable: a malformed snapshot or invalid threshold will not become valid
//! by asking again.

use thiserror::Error;

/// Main error type for costctl
#[derive(Error, Debug)]
pub enum CostctlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("AWS SDK error: {0}")]
    Aws(String),

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Retryable error (attempt {attempt}/{max_attempts}): {reason}")]
    Retryable {
        attempt: u32,
        max_attempts: u32,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostctlError>;

/// Trait for determining if an error is retryable
///
/// Used by the backoff policy in `src/retry.rs` to determine whether an
/// error should trigger another attempt.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for CostctlError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            CostctlError::Retryable { .. } | CostctlError::Aws(_) | CostctlError::Io(_)
        )
    }
}
