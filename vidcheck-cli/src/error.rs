// ============================================================================
// vidcheck-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses CoreError for everything that can go wrong and adds context
// where a failure originates in the CLI itself (log files, terminal output).
// Exit codes are derived from the error and from the session summary.
//
// AI-ASSISTANT-INFO: CLI error handling utilities and exit codes

// ---- Internal crate imports ----
use vidcheck_core::{CoreError, CoreResult, ValidationSummary};

// ---- Standard library imports ----
use std::fmt;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

// ============================================================================
// EXIT CODES
// ============================================================================

/// Every file decoded, or there was nothing to check.
pub const EXIT_OK: i32 = 0;
/// The run could not start or failed outright.
pub const EXIT_ERROR: i32 = 1;
/// At least one file could not be decoded.
pub const EXIT_UNPLAYABLE: i32 = 2;
/// Interrupted with Ctrl-C.
pub const EXIT_CANCELLED: i32 = 130;

/// Maps a finished session to the process exit code.
pub fn exit_code_for(summary: &ValidationSummary) -> i32 {
    if summary.cancelled {
        EXIT_CANCELLED
    } else if !summary.failures.is_empty() {
        EXIT_UNPLAYABLE
    } else {
        EXIT_OK
    }
}

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::InvalidInput(format!("{}: {}", context, core_error))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::InvalidInput(format!("{}: {}", f(), core_error))
        })
    }
}
