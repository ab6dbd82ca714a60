// ============================================================================
// vidcheck-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the vidcheck core library
//
// Input problems (missing directory, bad timeout, busy validator) are errors
// and are raised before any probe is dispatched. Per-file decode failures and
// timeouts are NOT errors: they are ProbeOutcome values collected by the
// validator so that one bad file never aborts a batch.
//
// AI-ASSISTANT-INFO: Error taxonomy and result alias for vidcheck-core

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};

/// Errors raised by the vidcheck core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Invalid timeout: {0}s (must be between {min} and {max} seconds)",
        min = MIN_TIMEOUT_SECS,
        max = MAX_TIMEOUT_SECS
    )]
    InvalidTimeout(u64),

    #[error("Cannot read directory '{}': {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A validation session is already running on this validator")]
    SessionActive,

    #[error("Failed to set up probe workers: {0}")]
    WorkerPool(String),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),
}

impl CoreError {
    /// Whether this error was caused by bad user input rather than the
    /// environment. Input errors leave the validator idle.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidInput(_) | CoreError::InvalidTimeout(_)
        )
    }
}

/// Result type for vidcheck-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CoreError::Directory` for `path`.
pub fn directory_error(path: impl Into<PathBuf>, source: io::Error) -> CoreError {
    CoreError::Directory {
        path: path.into(),
        source,
    }
}

/// Builds a `CoreError::CommandStart`.
pub fn command_start_error(cmd: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), source)
}
