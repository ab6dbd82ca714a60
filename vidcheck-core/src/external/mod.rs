// ============================================================================
// vidcheck-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg decoder
//
// This module encapsulates everything that touches the external decoder:
// locating it, checking it can be started, and running the first-frame probe.
// The ProbeRunner trait keeps the batch validator independent of ffmpeg so
// tests can drive it with in-process fakes.
//
// AI-ASSISTANT-INFO: External decoder interactions and abstractions

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

// ============================================================================
// SUBMODULES
// ============================================================================

/// First-frame probe and its outcome types
pub mod probe;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use probe::{FrameProbe, ProbeFailure, ProbeOutcome, ProbeRunner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that the decoder binary can be started.
///
/// Runs `<decoder> -version` and only looks at whether the process launched;
/// its exit status and output are ignored.
///
/// # Returns
///
/// * `Ok(())` - the decoder started
/// * `Err(CoreError::DependencyNotFound)` - the binary does not exist
/// * `Err(CoreError::CommandStart)` - the binary exists but failed to start
pub fn check_dependency(decoder: &Path) -> CoreResult<()> {
    let mut cmd = Command::new(decoder);
    cmd.arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    cmd.creation_flags(0x0800_0000);

    match cmd.status() {
        Ok(_) => {
            log::debug!("Found decoder: {}", decoder.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Decoder '{}' not found.", decoder.display());
            Err(CoreError::DependencyNotFound(decoder.display().to_string()))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                decoder.display(),
                e
            );
            Err(command_start_error(decoder.display().to_string(), e))
        }
    }
}
