//! Configuration structures and constants for the vidcheck-core library.
//!
//! This module holds the per-probe timeout type, the worker count and the
//! decoder location used by a check run.

mod builder;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub use builder::CheckConfigBuilder;

// Default constants

/// Smallest accepted per-file timeout, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Largest accepted per-file timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 60;

/// Default per-file timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Upper bound for the default worker count. Each worker runs its own
/// decoder process, so the default stays modest even on large machines.
pub const DEFAULT_MAX_JOBS: usize = 4;

/// Rough guidance for picking a timeout, shown in CLI help.
pub const TIMEOUT_GUIDANCE: &str =
    "3-10s; tens of MB >= 3; hundreds of MB >= 5; several GB >= 10";

/// Environment variable that overrides the decoder binary.
pub const DECODER_ENV_VAR: &str = "VIDCHECK_FFMPEG";

/// Per-file probe timeout, validated to lie within
/// [`MIN_TIMEOUT_SECS`, `MAX_TIMEOUT_SECS`]. The only public constructors are
/// [`ProbeTimeout::from_secs`] and `Default`, so every value is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProbeTimeout(Duration);

impl ProbeTimeout {
    /// Creates a timeout from whole seconds, rejecting values outside 1..=60.
    pub fn from_secs(secs: u64) -> CoreResult<Self> {
        if (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
            Ok(Self(Duration::from_secs(secs)))
        } else {
            Err(CoreError::InvalidTimeout(secs))
        }
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl Default for ProbeTimeout {
    fn default() -> Self {
        Self(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl From<ProbeTimeout> for Duration {
    fn from(timeout: ProbeTimeout) -> Self {
        timeout.0
    }
}

/// Returns the default number of concurrent probes.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(DEFAULT_MAX_JOBS)
}

/// Resolves the decoder binary: the `VIDCHECK_FFMPEG` environment variable if
/// set, otherwise the ffmpeg path used by ffmpeg-sidecar (a sidecar download
/// next to the executable, or plain `ffmpeg` from `PATH`).
pub fn default_decoder_path() -> PathBuf {
    match std::env::var_os(DECODER_ENV_VAR) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => ffmpeg_sidecar::paths::ffmpeg_path(),
    }
}

/// Configuration for one check run.
///
/// # Examples
///
/// ```rust
/// use vidcheck_core::config::CheckConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CheckConfigBuilder::new()
///     .directory(PathBuf::from("/path/to/videos"))
///     .timeout_secs(5)
///     .jobs(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout.as_secs(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Directory whose top-level video files are checked
    pub directory: PathBuf,

    /// Time allowed for each decoder process
    pub timeout: ProbeTimeout,

    /// Number of probes run concurrently (at least 1)
    pub jobs: usize,

    /// Decoder binary (ffmpeg or a compatible stand-in)
    pub decoder_path: PathBuf,
}

impl CheckConfig {
    /// Creates a configuration with default timeout, jobs and decoder.
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            timeout: ProbeTimeout::default(),
            jobs: default_jobs(),
            decoder_path: default_decoder_path(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput(
                "no directory selected".to_string(),
            ));
        }
        let secs = self.timeout.as_secs();
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
            return Err(CoreError::InvalidTimeout(secs));
        }
        if self.jobs == 0 {
            return Err(CoreError::InvalidInput(
                "jobs must be at least 1".to_string(),
            ));
        }
        if self.decoder_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput(
                "decoder path is empty".to_string(),
            ));
        }
        Ok(())
    }
}
