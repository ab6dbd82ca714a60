// ============================================================================
// vidcheck-core/src/validator/mod.rs
// ============================================================================
//
// BATCH VALIDATOR: Concurrent, cancellable playability checks
//
// A BatchValidator runs at most one session at a time. start() returns
// immediately: a coordinator thread owns a bounded rayon pool whose workers
// each probe one file at a time, checking the cancel flag before every
// dispatch. Results flow into the shared session state, which pushes events
// to the caller's handler and also serves polling queries.
//
// KEY COMPONENTS:
// - BatchValidator: owns the probe runner and the single-session guard
// - ValidationHandle: caller side of a session (poll, cancel, wait)
// - ValidationSummary: final result
//
// AI-ASSISTANT-INFO: Batch validation engine with worker pool and cancellation

mod session;

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use rayon::prelude::*;

use crate::config::{CheckConfig, ProbeTimeout};
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventHandler};
use crate::external::{FrameProbe, ProbeRunner};

pub use session::{SessionState, ValidationHandle, ValidationSummary};

use session::SessionShared;

/// Runs playability checks over batches of files.
pub struct BatchValidator {
    runner: Arc<dyn ProbeRunner>,
    jobs: usize,
    active: Mutex<Option<Arc<SessionShared>>>,
}

impl BatchValidator {
    /// Creates a validator running up to `jobs` probes at once (minimum 1).
    pub fn new(runner: Arc<dyn ProbeRunner>, jobs: usize) -> Self {
        Self {
            runner,
            jobs: jobs.max(1),
            active: Mutex::new(None),
        }
    }

    /// Creates a validator that probes with the configured decoder.
    pub fn from_config(config: &CheckConfig) -> Self {
        Self::new(
            Arc::new(FrameProbe::new(config.decoder_path.clone())),
            config.jobs,
        )
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// State of the most recent session, or `Idle` if none was started.
    pub fn state(&self) -> SessionState {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(SessionState::Idle, |shared| shared.state())
    }

    /// Whether a session is running or cancelling.
    pub fn is_busy(&self) -> bool {
        self.state().is_active()
    }

    /// Starts a session over `targets`.
    ///
    /// Repeated paths are probed once; `total` counts distinct targets. An
    /// empty target list completes immediately; its summary reports
    /// `nothing_to_check()`.
    ///
    /// Events are emitted after the single-session guard is released, so a
    /// handler may query or restart this validator from inside a callback.
    ///
    /// # Errors
    ///
    /// * `CoreError::SessionActive` - the previous session has not completed
    /// * `CoreError::WorkerPool` / `CoreError::Io` - worker threads could not be created
    pub fn start(
        &self,
        targets: Vec<PathBuf>,
        timeout: ProbeTimeout,
        events: Arc<dyn EventHandler>,
    ) -> CoreResult<ValidationHandle> {
        let targets = distinct_targets(targets);
        let total = targets.len();
        let workers = self.jobs.min(total);

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|shared| shared.state().is_active()) {
            return Err(CoreError::SessionActive);
        }

        let pool = if total == 0 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("vidcheck-probe-{}", i))
                .build()
                .map_err(|e| CoreError::WorkerPool(e.to_string()))?;
            Some(pool)
        };

        let shared = Arc::new(SessionShared::new(total, timeout, events));
        *active = Some(Arc::clone(&shared));
        drop(active);

        shared.emit(Event::SessionStarted {
            total,
            timeout_secs: timeout.as_duration().as_secs_f64(),
            jobs: workers,
        });

        let Some(pool) = pool else {
            log::info!("No files to check; session completes immediately");
            shared.finish();
            return Ok(ValidationHandle {
                shared,
                coordinator: None,
            });
        };

        log::info!(
            "Checking {} file(s) with {} worker(s), timeout {}s",
            total,
            workers,
            timeout.as_duration().as_secs_f64()
        );

        let runner = Arc::clone(&self.runner);
        let worker_shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name("vidcheck-coordinator".to_string())
            .spawn(move || run_session(pool, runner, worker_shared, targets));

        match spawned {
            Ok(coordinator) => Ok(ValidationHandle {
                shared,
                coordinator: Some(coordinator),
            }),
            Err(e) => {
                // The session is already registered; complete it so the validator is not left busy.
                shared.finish();
                Err(e.into())
            }
        }
    }

    /// Requests cancellation of `handle`'s session.
    ///
    /// Returns false if the session was already completed or cancelling.
    pub fn cancel(&self, handle: &ValidationHandle) -> bool {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(shared) = active.as_ref() {
            if !handle.is_same_session(shared) {
                log::debug!("Cancel requested for a session this validator no longer tracks");
            }
        }
        drop(active);
        handle.cancel()
    }
}

/// Drops repeated paths, keeping the first occurrence of each.
fn distinct_targets(targets: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(targets.len());
    let mut distinct = Vec::with_capacity(targets.len());
    for target in targets {
        if seen.contains(&target) {
            log::warn!("Ignoring repeated target {}", target.display());
            continue;
        }
        seen.insert(target.clone());
        distinct.push(target);
    }
    distinct
}

/// Coordinator body: probes every target on the pool, then completes the session.
fn run_session(
    pool: rayon::ThreadPool,
    runner: Arc<dyn ProbeRunner>,
    shared: Arc<SessionShared>,
    targets: Vec<PathBuf>,
) {
    let timeout = shared.timeout();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pool.install(|| {
            targets.par_iter().for_each(|target| {
                if shared.cancel_requested() {
                    return;
                }
                match runner.probe_cancellable(target, timeout, shared.cancel_flag()) {
                    Some(outcome) => shared.record(target, outcome),
                    None => log::debug!("Probe of {} aborted", target.display()),
                }
            });
        });
    }));

    if result.is_err() {
        log::error!("A probe worker panicked; completing session with partial results");
    }

    let summary = shared.finish();
    if summary.cancelled {
        log::info!(
            "Session cancelled after {} of {} file(s); {} unplayable",
            summary.checked,
            summary.total,
            summary.failures.len()
        );
    } else {
        log::info!(
            "Session finished: {} file(s) checked, {} unplayable",
            summary.checked,
            summary.failures.len()
        );
    }
}
