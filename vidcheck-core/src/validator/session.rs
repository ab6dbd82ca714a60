// ============================================================================
// vidcheck-core/src/validator/session.rs
// ============================================================================
//
// VALIDATION SESSION: Shared state of one batch run and its caller handle
//
// The progress counter, the failure list and the lifecycle state sit behind a
// single mutex so that concurrent probes update them atomically. A second
// mutex (`emit_order`) serializes "update + emit" so handlers observe
// progress events in counter order even though probes finish out of order.
// Handlers may call the polling accessors and cancel() from inside an event.
//
// AI-ASSISTANT-INFO: Session state, summary and handle for the batch validator

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::ProbeTimeout;
use crate::events::{Event, EventHandler};
use crate::external::{ProbeFailure, ProbeOutcome};
use crate::utils::percent_complete;

/// Lifecycle of a validation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Running,
    Cancelling,
    Completed,
}

impl SessionState {
    /// Running or Cancelling: the session still owns worker threads.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Running | SessionState::Cancelling)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Cancelling => "cancelling",
            SessionState::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

/// Final result of a session.
#[derive(Debug, Clone)]
pub struct ValidationSummary {
    /// Number of files the session was started with
    pub total: usize,
    /// Number of files whose probe finished and was recorded
    pub checked: usize,
    /// Unplayable files in the order they were discovered
    pub failures: Vec<ProbeFailure>,
    /// Whether the session was cancelled before every file was probed
    pub cancelled: bool,
    /// Wall time from start to completion
    pub elapsed: Duration,
}

impl ValidationSummary {
    /// The directory held no video files, so nothing was probed.
    pub fn nothing_to_check(&self) -> bool {
        self.total == 0
    }

    /// Every file was probed and every file decoded.
    pub fn all_playable(&self) -> bool {
        !self.cancelled && self.total > 0 && self.checked == self.total && self.failures.is_empty()
    }

    pub fn progress_percent(&self) -> f32 {
        percent_complete(self.checked, self.total)
    }

    pub fn timed_out_count(&self) -> usize {
        self.failures.iter().filter(|f| f.timed_out()).count()
    }
}

struct SessionProgress {
    state: SessionState,
    checked: usize,
    failures: Vec<ProbeFailure>,
    summary: Option<ValidationSummary>,
}

/// State shared between the handle, the coordinator and the probe workers.
pub(crate) struct SessionShared {
    total: usize,
    timeout: ProbeTimeout,
    started_at: Instant,
    cancel: AtomicBool,
    progress: Mutex<SessionProgress>,
    emit_order: Mutex<()>,
    events: Arc<dyn EventHandler>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking event handler must not wedge the session.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionShared {
    pub(crate) fn new(total: usize, timeout: ProbeTimeout, events: Arc<dyn EventHandler>) -> Self {
        Self {
            total,
            timeout,
            started_at: Instant::now(),
            cancel: AtomicBool::new(false),
            progress: Mutex::new(SessionProgress {
                state: SessionState::Running,
                checked: 0,
                failures: Vec::new(),
                summary: None,
            }),
            emit_order: Mutex::new(()),
            events,
        }
    }

    pub(crate) fn timeout(&self) -> ProbeTimeout {
        self.timeout
    }

    pub(crate) fn cancel_flag(&self) -> &AtomicBool {
        &self.cancel
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub(crate) fn emit(&self, event: Event) {
        let _order = lock(&self.emit_order);
        self.events.handle(&event);
    }

    pub(crate) fn state(&self) -> SessionState {
        lock(&self.progress).state
    }

    /// Records a finished probe. Ignored once the session left `Running`.
    pub(crate) fn record(&self, path: &Path, outcome: ProbeOutcome) {
        let _order = lock(&self.emit_order);

        let (checked, failure) = {
            let mut progress = lock(&self.progress);
            if progress.state != SessionState::Running {
                log::debug!(
                    "Discarding result for {} after cancellation",
                    path.display()
                );
                return;
            }
            if progress.checked >= self.total {
                log::error!("Probe result for {} exceeds the target count", path.display());
                return;
            }
            if progress.failures.iter().any(|f| f.path == path) {
                log::warn!("Ignoring duplicate result for {}", path.display());
                return;
            }

            progress.checked += 1;
            let failure = if outcome.is_playable() {
                None
            } else {
                let failure = ProbeFailure {
                    path: path.to_path_buf(),
                    outcome,
                };
                progress.failures.push(failure.clone());
                Some(failure)
            };
            (progress.checked, failure)
        };

        if let Some(failure) = failure {
            log::warn!("Unplayable: {} ({})", path.display(), failure.outcome);
            self.events.handle(&Event::FailureDetected { failure });
        } else {
            log::debug!("Playable: {}", path.display());
        }
        self.events.handle(&Event::Progress {
            checked,
            total: self.total,
            percent: percent_complete(checked, self.total),
        });
    }

    /// Moves Running to Cancelling and raises the cancel flag.
    ///
    /// Returns false if the session was not running.
    pub(crate) fn request_cancel(&self) -> bool {
        {
            let mut progress = lock(&self.progress);
            if progress.state != SessionState::Running {
                return false;
            }
            progress.state = SessionState::Cancelling;
            self.cancel.store(true, Ordering::SeqCst);
        }
        log::info!("Cancellation requested; stopping in-flight probes");
        // Not ordered through emit_order: handlers may cancel from inside an event.
        self.events.handle(&Event::CancelRequested);
        true
    }

    /// Marks the session completed and emits the final event.
    ///
    /// Safe to call more than once; only the first call emits.
    pub(crate) fn finish(&self) -> ValidationSummary {
        let _order = lock(&self.emit_order);

        let summary = {
            let mut progress = lock(&self.progress);
            if let Some(summary) = &progress.summary {
                return summary.clone();
            }
            // A cancel that lands after the last probe changes nothing.
            let cancelled =
                progress.state == SessionState::Cancelling && progress.checked < self.total;
            progress.state = SessionState::Completed;
            let summary = ValidationSummary {
                total: self.total,
                checked: progress.checked,
                failures: progress.failures.clone(),
                cancelled,
                elapsed: self.started_at.elapsed(),
            };
            progress.summary = Some(summary.clone());
            summary
        };

        self.events.handle(&Event::Completed {
            summary: summary.clone(),
        });
        summary
    }

    pub(crate) fn summary(&self) -> Option<ValidationSummary> {
        lock(&self.progress).summary.clone()
    }

    /// Summary if finished, otherwise a snapshot of the current progress.
    fn snapshot(&self) -> ValidationSummary {
        let progress = lock(&self.progress);
        if let Some(summary) = &progress.summary {
            return summary.clone();
        }
        ValidationSummary {
            total: self.total,
            checked: progress.checked,
            failures: progress.failures.clone(),
            cancelled: progress.state == SessionState::Cancelling,
            elapsed: self.started_at.elapsed(),
        }
    }
}

/// Caller-side handle of a running (or finished) session.
///
/// Dropping the handle does not stop the session; call [`cancel`](Self::cancel).
pub struct ValidationHandle {
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) coordinator: Option<JoinHandle<()>>,
}

impl ValidationHandle {
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Running or Cancelling.
    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == SessionState::Completed
    }

    pub fn total(&self) -> usize {
        self.shared.total
    }

    pub fn checked(&self) -> usize {
        lock(&self.shared.progress).checked
    }

    /// Progress in percent, for polling front ends.
    pub fn progress_percent(&self) -> f32 {
        percent_complete(self.checked(), self.shared.total)
    }

    /// Failures found so far, in discovery order.
    pub fn failures(&self) -> Vec<ProbeFailure> {
        lock(&self.shared.progress).failures.clone()
    }

    /// Final summary, once the session has completed.
    pub fn summary(&self) -> Option<ValidationSummary> {
        self.shared.summary()
    }

    /// Requests cancellation. Returns false if the session was not running.
    pub fn cancel(&self) -> bool {
        self.shared.request_cancel()
    }

    /// Blocks until the session completes and returns its summary.
    pub fn wait(mut self) -> ValidationSummary {
        if let Some(coordinator) = self.coordinator.take() {
            if coordinator.join().is_err() {
                log::error!("Validation coordinator thread panicked");
            }
        }
        match self.shared.summary() {
            Some(summary) => summary,
            None => self.shared.snapshot(),
        }
    }

    pub(crate) fn is_same_session(&self, shared: &Arc<SessionShared>) -> bool {
        Arc::ptr_eq(&self.shared, shared)
    }
}

impl fmt::Debug for ValidationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationHandle")
            .field("state", &self.state())
            .field("checked", &self.checked())
            .field("total", &self.total())
            .finish()
    }
}
