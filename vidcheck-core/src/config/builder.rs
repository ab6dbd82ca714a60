// ============================================================================
// vidcheck-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CheckConfig
//
// Provides a fluent API for assembling a CheckConfig. The timeout is kept as
// raw seconds until build() so that an out-of-range value surfaces as an
// InvalidTimeout error instead of being silently clamped.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CheckConfig

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{CheckConfig, ProbeTimeout};
use crate::error::{CoreError, CoreResult};

/// Builder for creating CheckConfig instances.
#[derive(Debug, Clone)]
pub struct CheckConfigBuilder {
    // Required fields
    directory: Option<PathBuf>,

    // Optional fields with defaults
    timeout_secs: u64,
    jobs: Option<usize>,
    decoder_path: Option<PathBuf>,
}

impl Default for CheckConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckConfigBuilder {
    /// Creates a new CheckConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            directory: None,
            timeout_secs: super::DEFAULT_TIMEOUT_SECS,
            jobs: None,
            decoder_path: None,
        }
    }

    /// Sets the directory to scan.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Sets the per-file timeout in seconds (validated by `build`).
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the number of concurrent probes.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Sets the decoder binary.
    pub fn decoder_path(mut self, path: PathBuf) -> Self {
        self.decoder_path = Some(path);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// * `CoreError::InvalidInput` - no directory was set, or jobs is zero
    /// * `CoreError::InvalidTimeout` - the timeout is outside 1..=60 seconds
    pub fn build(self) -> CoreResult<CheckConfig> {
        let directory = self
            .directory
            .ok_or_else(|| CoreError::InvalidInput("no directory selected".to_string()))?;
        let timeout = ProbeTimeout::from_secs(self.timeout_secs)?;

        let config = CheckConfig {
            directory,
            timeout,
            jobs: self.jobs.unwrap_or_else(super::default_jobs),
            decoder_path: self.decoder_path.unwrap_or_else(super::default_decoder_path),
        };
        config.validate()?;
        Ok(config)
    }
}
