//! Exit code standardization for costctl
//!
//! Provides consistent exit codes for different error types to enable
//! reliable programmatic error detection by scripts and report pipelines.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (invalid input, validation failure, unsupported data format)
//! - `2` = System error (AWS API failure, network error, I/O failure)
//! - `3` = Configuration error (invalid config file, bad threshold values)

use crate::error::CostctlError;

/// Standard exit codes for costctl
pub mod codes {
    /// Success
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (AWS API failure, network error)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error (missing config, invalid values)
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a CostctlError to an appropriate exit code
///
/// Categorizes errors into user errors, system errors, and config errors so
/// callers (cron jobs, report pipelines) can branch on the exit status.
pub fn exit_code_for_error(error: &CostctlError) -> i32 {
    use CostctlError::*;
    match error {
        // Configuration errors
        Config(_) => codes::CONFIG_ERROR,

        // User errors (invalid input, validation failures)
        Validation { .. } => codes::USER_ERROR,
        DataFormat(_) => codes::USER_ERROR,

        // System errors (cloud provider, network, I/O)
        Aws(_) => codes::SYSTEM_ERROR,
        Retryable { .. } => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}
