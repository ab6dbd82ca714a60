// ============================================================================
// vidcheck-core/src/external/probe.rs
// ============================================================================
//
// FIRST-FRAME PROBE: One ffmpeg process per file, bounded by a timeout
//
// A file counts as playable when ffmpeg can decode its first frame into the
// null muxer and exit with status 0. The process is polled with try_wait so
// that both the per-file deadline and a cancellation flag are observed while
// it runs. On either, the process is killed AND reaped so nothing is left
// behind when the call returns.
//
// KEY COMPONENTS:
// - ProbeOutcome / ProbeFailure: classified result of one probe
// - ProbeRunner: trait seam the batch validator depends on
// - FrameProbe: ffmpeg-backed implementation
//
// AI-ASSISTANT-INFO: ffmpeg first-frame decode probe with timeout and kill

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

use crate::config::ProbeTimeout;

/// Video filter that keeps only frame index 0.
pub const FIRST_FRAME_FILTER: &str = r"select=eq(n\,0)";

/// Interval between `try_wait` polls of a running decoder.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Diagnostics beyond this many bytes are read and dropped.
const MAX_DIAGNOSTIC_BYTES: usize = 4096;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of probing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The first frame decoded and the decoder exited with status 0.
    Playable,
    /// The decoder exited non-zero or could not be started.
    Unplayable {
        /// Decoder diagnostics, or the exit status when it printed nothing
        reason: String,
    },
    /// The decoder did not finish in time and was killed.
    TimedOut {
        /// The timeout that was exceeded
        after: Duration,
    },
}

impl ProbeOutcome {
    pub fn is_playable(&self) -> bool {
        matches!(self, ProbeOutcome::Playable)
    }

    /// Short machine-friendly label.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeOutcome::Playable => "playable",
            ProbeOutcome::Unplayable { .. } => "unplayable",
            ProbeOutcome::TimedOut { .. } => "timed_out",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Playable => write!(f, "playable"),
            ProbeOutcome::Unplayable { reason } => write!(f, "decode failed: {}", reason),
            ProbeOutcome::TimedOut { after } => {
                write!(f, "timed out after {}s", after.as_secs_f64())
            }
        }
    }
}

/// A file that did not pass its probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub path: PathBuf,
    pub outcome: ProbeOutcome,
}

impl ProbeFailure {
    /// The file name, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::TimedOut { .. })
    }
}

// ============================================================================
// PROBE ABSTRACTION
// ============================================================================

/// Something that can decide whether a single file is playable.
///
/// Implementations must be safe to call from several threads at once and
/// keep no state between calls.
pub trait ProbeRunner: Send + Sync {
    /// Probes `path`, giving up after `timeout`.
    ///
    /// Returns `None` if `cancel` was raised while the probe ran; the probe's
    /// work (including any child process) has been torn down by then.
    fn probe_cancellable(
        &self,
        path: &Path,
        timeout: ProbeTimeout,
        cancel: &AtomicBool,
    ) -> Option<ProbeOutcome>;
}

/// ffmpeg-backed first-frame probe.
#[derive(Debug, Clone)]
pub struct FrameProbe {
    decoder: PathBuf,
    poll_interval: Duration,
}

impl FrameProbe {
    /// Creates a probe that runs `decoder` (normally an ffmpeg binary).
    pub fn new(decoder: impl Into<PathBuf>) -> Self {
        Self {
            decoder: decoder.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides how often the running process is polled.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn decoder(&self) -> &Path {
        &self.decoder
    }

    /// Builds the decoder command for `path`.
    ///
    /// `-v error` keeps stderr down to real problems, `select=eq(n\,0)` stops
    /// after the first frame and `-f null -` throws the decoded output away.
    pub fn build_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.decoder);
        cmd.args(["-v", "error", "-i"])
            .arg(path)
            .args(["-vf", FIRST_FRAME_FILTER, "-f", "null", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        cmd
    }

    /// Probes `path` without a cancellation source.
    pub fn probe(&self, path: &Path, timeout: ProbeTimeout) -> ProbeOutcome {
        let never = AtomicBool::new(false);
        self.probe_cancellable(path, timeout, &never)
            .unwrap_or(ProbeOutcome::Unplayable {
                reason: "probe cancelled".to_string(),
            })
    }
}

impl ProbeRunner for FrameProbe {
    fn probe_cancellable(
        &self,
        path: &Path,
        timeout: ProbeTimeout,
        cancel: &AtomicBool,
    ) -> Option<ProbeOutcome> {
        let mut cmd = self.build_command(path);
        log::debug!("Probing {}: {:?}", path.display(), cmd);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                log::error!(
                    "Failed to start decoder '{}' for {}: {}",
                    self.decoder.display(),
                    path.display(),
                    e
                );
                return Some(ProbeOutcome::Unplayable {
                    reason: format!(
                        "failed to start decoder '{}': {}",
                        self.decoder.display(),
                        e
                    ),
                });
            }
        };

        let diagnostics = child.stderr.take().map(spawn_diagnostics_reader);
        let limit = timeout.as_duration();
        let started = Instant::now();

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let text = diagnostics
                        .map(|handle| handle.join().unwrap_or_default())
                        .unwrap_or_default();
                    return Some(classify_exit(status, &text));
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("Failed to wait for decoder on {}: {}", path.display(), e);
                    terminate(&mut child, path);
                    return Some(ProbeOutcome::Unplayable {
                        reason: format!("failed to wait for decoder: {}", e),
                    });
                }
            }

            if cancel.load(Ordering::SeqCst) {
                log::debug!("Probe of {} cancelled", path.display());
                terminate(&mut child, path);
                return None;
            }

            let elapsed = started.elapsed();
            if elapsed >= limit {
                log::debug!(
                    "Probe of {} exceeded {:?}, killing decoder",
                    path.display(),
                    limit
                );
                terminate(&mut child, path);
                // The reader thread finishes on its own once the pipe closes.
                return Some(ProbeOutcome::TimedOut { after: limit });
            }

            thread::sleep(self.poll_interval.min(limit - elapsed));
        }
    }
}

/// Drains stderr on its own thread so a chatty decoder never blocks on a
/// full pipe. Keeps at most `MAX_DIAGNOSTIC_BYTES`.
fn spawn_diagnostics_reader<R: Read + Send + 'static>(mut stderr: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut kept = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match stderr.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let room = MAX_DIAGNOSTIC_BYTES.saturating_sub(kept.len());
                    kept.extend_from_slice(&chunk[..n.min(room)]);
                }
            }
        }
        String::from_utf8_lossy(&kept).into_owned()
    })
}

/// Kills the child and waits for it so no zombie or orphan remains.
fn terminate(child: &mut Child, path: &Path) {
    if let Err(e) = child.kill() {
        // InvalidInput means it already exited
        log::debug!("kill() on decoder for {} failed: {}", path.display(), e);
    }
    if let Err(e) = child.wait() {
        log::warn!("Failed to reap decoder for {}: {}", path.display(), e);
    }
}

fn classify_exit(status: ExitStatus, diagnostics: &str) -> ProbeOutcome {
    if status.success() {
        return ProbeOutcome::Playable;
    }
    let trimmed = diagnostics.trim();
    let reason = if trimmed.is_empty() {
        format!("decoder exited with {}", status)
    } else {
        trimmed.to_string()
    };
    ProbeOutcome::Unplayable { reason }
}
