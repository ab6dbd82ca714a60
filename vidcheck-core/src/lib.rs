//! Core library for checking whether video files can be decoded.
//!
//! A check scans one directory for video files, probes each file's first
//! frame with ffmpeg under a per-file timeout, and reports the files that
//! could not be decoded. Probes run concurrently on a bounded worker pool;
//! progress and failures are pushed to an [`events::EventHandler`] as they
//! happen and can also be polled from the [`ValidationHandle`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use vidcheck_core::config::CheckConfigBuilder;
//! use vidcheck_core::events::NullEventHandler;
//! use vidcheck_core::{BatchValidator, start_directory_check};
//!
//! let config = CheckConfigBuilder::new()
//!     .directory(PathBuf::from("/path/to/videos"))
//!     .timeout_secs(5)
//!     .build()
//!     .unwrap();
//!
//! let validator = BatchValidator::from_config(&config);
//! let handle = start_directory_check(&validator, &config, Arc::new(NullEventHandler)).unwrap();
//! let summary = handle.wait();
//! for failure in &summary.failures {
//!     println!("{}: {}", failure.file_name(), failure.outcome);
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod external;
pub mod utils;
pub mod validator;

use std::sync::Arc;

// Re-exports for public API
pub use config::{CheckConfig, ProbeTimeout};
pub use discovery::{VIDEO_EXTENSIONS, find_video_files, is_video_file};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventHandler};
pub use external::{FrameProbe, ProbeFailure, ProbeOutcome, ProbeRunner, check_dependency};
pub use utils::{format_duration, percent_complete};
pub use validator::{BatchValidator, SessionState, ValidationHandle, ValidationSummary};

/// Validates `config`, scans its directory and starts a session on `validator`.
///
/// Input errors (bad timeout, unreadable directory, busy validator) are
/// returned before any probe is dispatched. A directory without video files
/// yields a handle that is already completed with `nothing_to_check()`.
pub fn start_directory_check(
    validator: &BatchValidator,
    config: &CheckConfig,
    events: Arc<dyn EventHandler>,
) -> CoreResult<ValidationHandle> {
    config.validate()?;
    if validator.is_busy() {
        return Err(CoreError::SessionActive);
    }
    let targets = find_video_files(&config.directory)?;
    validator.start(targets, config.timeout, events)
}
