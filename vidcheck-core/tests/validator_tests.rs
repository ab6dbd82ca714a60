// vidcheck-core/tests/validator_tests.rs
//
// Session-level behaviour of BatchValidator: progress and failure reporting,
// cancellation, restarts and the directory entry point.

mod common;

use common::{Recorder, create_dummy_file};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, mpsc};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;
use vidcheck_core::config::{CheckConfig, CheckConfigBuilder, ProbeTimeout};
use vidcheck_core::error::CoreError;
use vidcheck_core::events::{ChannelEventHandler, Event, EventHandler, NullEventHandler};
use vidcheck_core::external::{ProbeOutcome, ProbeRunner};
use vidcheck_core::{BatchValidator, SessionState, start_directory_check};

/// Answers each path from a table after an optional delay.
#[derive(Default)]
struct ScriptedRunner {
    outcomes: HashMap<PathBuf, (Duration, ProbeOutcome)>,
    calls: AtomicUsize,
}

impl ScriptedRunner {
    fn with(mut self, path: &str, delay_ms: u64, outcome: ProbeOutcome) -> Self {
        self.outcomes.insert(
            PathBuf::from(path),
            (Duration::from_millis(delay_ms), outcome),
        );
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbeRunner for ScriptedRunner {
    fn probe_cancellable(
        &self,
        path: &Path,
        _timeout: ProbeTimeout,
        cancel: &AtomicBool,
    ) -> Option<ProbeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, outcome) = self
            .outcomes
            .get(path)
            .cloned()
            .unwrap_or((Duration::ZERO, ProbeOutcome::Playable));
        let step = Duration::from_millis(5);
        let mut waited = Duration::ZERO;
        while waited < delay {
            if cancel.load(Ordering::SeqCst) {
                return None;
            }
            thread::sleep(step);
            waited += step;
        }
        Some(outcome)
    }
}

fn corrupt() -> ProbeOutcome {
    ProbeOutcome::Unplayable {
        reason: "Invalid data found when processing input".into(),
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn test_failures_listed_in_discovery_order() {
    // With two workers the slow first file fails after the fast second one.
    let runner = ScriptedRunner::default()
        .with("slow.mp4", 300, corrupt())
        .with("fast.mkv", 0, corrupt());
    let validator = BatchValidator::new(Arc::new(runner), 2);
    let recorder = Arc::new(Recorder::default());

    let handle = validator
        .start(
            paths(&["slow.mp4", "fast.mkv"]),
            ProbeTimeout::default(),
            recorder.clone(),
        )
        .unwrap();
    let summary = handle.wait();

    let names: Vec<String> = summary.failures.iter().map(|f| f.file_name()).collect();
    assert_eq!(names, vec!["fast.mkv", "slow.mp4"]);
    assert_eq!(recorder.failure_names(), names);
}

#[test]
fn test_progress_is_monotonic_and_completes_once() {
    let mut runner = ScriptedRunner::default();
    let names: Vec<String> = (0..20).map(|i| format!("clip{:02}.mp4", i)).collect();
    for (i, name) in names.iter().enumerate() {
        let outcome = if i % 5 == 0 { corrupt() } else { ProbeOutcome::Playable };
        runner = runner.with(name, (i as u64 * 7) % 30, outcome);
    }
    let validator = BatchValidator::new(Arc::new(runner), 4);
    let recorder = Arc::new(Recorder::default());

    let targets: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
    let summary = validator
        .start(targets, ProbeTimeout::default(), recorder.clone())
        .unwrap()
        .wait();

    assert_eq!(recorder.progress_values(), (1..=20).collect::<Vec<_>>());
    assert_eq!(recorder.completed_count(), 1);
    assert_eq!(summary.checked, 20);
    assert_eq!(summary.failures.len(), 4);
    assert_eq!(summary.progress_percent(), 100.0);
    assert!(!summary.cancelled);

    let events = recorder.events();
    assert!(matches!(events.first(), Some(Event::SessionStarted { total: 20, .. })));
    assert!(matches!(events.last(), Some(Event::Completed { .. })));
}

#[test]
fn test_failure_event_precedes_its_progress_event() {
    let runner = ScriptedRunner::default().with("bad.avi", 0, corrupt());
    let validator = BatchValidator::new(Arc::new(runner), 1);
    let recorder = Arc::new(Recorder::default());

    validator
        .start(paths(&["bad.avi"]), ProbeTimeout::default(), recorder.clone())
        .unwrap()
        .wait();

    let events = recorder.events();
    let failure_at = events
        .iter()
        .position(|e| matches!(e, Event::FailureDetected { .. }))
        .unwrap();
    let progress_at = events
        .iter()
        .position(|e| matches!(e, Event::Progress { checked: 1, .. }))
        .unwrap();
    assert!(failure_at < progress_at);
}

#[test]
fn test_cancel_mid_session_stops_dispatch() {
    let mut runner = ScriptedRunner::default();
    let names: Vec<String> = (0..10).map(|i| format!("v{}.mp4", i)).collect();
    for name in &names {
        runner = runner.with(name, 100, ProbeOutcome::Playable);
    }
    let runner = Arc::new(runner);
    let validator = BatchValidator::new(runner.clone(), 1);
    let (tx, rx) = mpsc::channel();

    let targets: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
    let handle = validator
        .start(targets, ProbeTimeout::default(), Arc::new(ChannelEventHandler::new(tx)))
        .unwrap();

    // Cancel as soon as the first file has been checked.
    for event in rx.iter() {
        if matches!(event, Event::Progress { .. }) {
            assert!(validator.cancel(&handle));
            break;
        }
    }
    assert!(!handle.cancel());

    let summary = handle.wait();
    assert!(summary.cancelled);
    assert!(summary.checked < summary.total);
    assert!(runner.calls() < 10);

    let later: Vec<Event> = rx.try_iter().collect();
    assert!(later.iter().any(|e| matches!(e, Event::CancelRequested)));
    assert!(matches!(later.last(), Some(Event::Completed { .. })));
    assert!(!later.iter().any(|e| matches!(e, Event::Progress { .. })));
    assert_eq!(validator.state(), SessionState::Completed);
}

#[test]
fn test_restart_after_cancel_and_completion() {
    let runner = ScriptedRunner::default().with("long.mp4", 5_000, ProbeOutcome::Playable);
    let validator = BatchValidator::new(Arc::new(runner), 2);

    let first = validator
        .start(paths(&["long.mp4"]), ProbeTimeout::default(), Arc::new(NullEventHandler))
        .unwrap();
    assert!(first.cancel());
    let first = first.wait();
    assert!(first.cancelled);
    assert_eq!(first.checked, 0);

    let second = validator
        .start(
            paths(&["a.mp4", "b.mp4"]),
            ProbeTimeout::default(),
            Arc::new(NullEventHandler),
        )
        .unwrap()
        .wait();
    assert!(second.all_playable());

    let third = validator
        .start(paths(&["c.mp4"]), ProbeTimeout::default(), Arc::new(NullEventHandler))
        .unwrap()
        .wait();
    assert_eq!(third.checked, 1);
}

#[test]
fn test_independent_validators_run_side_by_side() {
    let slow = ScriptedRunner::default().with("x.mp4", 200, corrupt());
    let quick = ScriptedRunner::default();
    let first = BatchValidator::new(Arc::new(slow), 1);
    let second = BatchValidator::new(Arc::new(quick), 1);

    let a = first
        .start(paths(&["x.mp4"]), ProbeTimeout::default(), Arc::new(NullEventHandler))
        .unwrap();
    let b = second
        .start(paths(&["y.mp4"]), ProbeTimeout::default(), Arc::new(NullEventHandler))
        .unwrap();

    let b = b.wait();
    assert!(b.all_playable());
    let a = a.wait();
    assert_eq!(a.failures.len(), 1);
}

#[test]
fn test_progress_can_be_polled() {
    let mut runner = ScriptedRunner::default();
    for name in ["a.mp4", "b.mp4", "c.mp4", "d.mp4"] {
        runner = runner.with(name, 50, ProbeOutcome::Playable);
    }
    let validator = BatchValidator::new(Arc::new(runner), 1);
    let handle = validator
        .start(
            paths(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]),
            ProbeTimeout::default(),
            Arc::new(NullEventHandler),
        )
        .unwrap();

    let mut seen = Vec::new();
    while !handle.is_finished() {
        seen.push(handle.progress_percent());
        thread::sleep(Duration::from_millis(10));
    }
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|p| (0.0..=100.0).contains(p)));
    assert_eq!(handle.progress_percent(), 100.0);
    assert!(handle.wait().all_playable());
}

#[test]
fn test_invalid_timeout_rejected_before_probing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    create_dummy_file(dir.path(), "a.mp4");
    let runner = Arc::new(ScriptedRunner::default());
    let validator = BatchValidator::new(runner.clone(), 2);

    for secs in [0, 61] {
        let result = CheckConfigBuilder::new()
            .directory(dir.path().to_path_buf())
            .timeout_secs(secs)
            .build();
        assert!(matches!(result, Err(CoreError::InvalidTimeout(s)) if s == secs));
    }
    assert!(ProbeTimeout::from_secs(0).is_err());
    assert_eq!(runner.calls(), 0);
    assert_eq!(validator.state(), SessionState::Idle);
    Ok(())
}

#[test]
fn test_repeated_targets_are_checked_once() {
    let runner = Arc::new(ScriptedRunner::default().with("b.mkv", 0, corrupt()));
    let validator = BatchValidator::new(runner.clone(), 2);
    let recorder = Arc::new(Recorder::default());

    let summary = validator
        .start(
            paths(&["b.mkv", "a.mp4", "b.mkv"]),
            ProbeTimeout::default(),
            recorder.clone(),
        )
        .unwrap()
        .wait();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.progress_percent(), 100.0);
    assert!(!summary.cancelled);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(runner.calls(), 2);
    assert_eq!(recorder.progress_values(), vec![1, 2]);
    assert_eq!(recorder.completed_count(), 1);
}

/// Calls back into the validator from inside its own events.
#[derive(Default)]
struct ReentrantHandler {
    validator: OnceLock<Arc<BatchValidator>>,
    started_states: Mutex<Vec<SessionState>>,
    busy_on_completed: Mutex<Vec<bool>>,
    restarted: Mutex<Option<bool>>,
}

impl EventHandler for ReentrantHandler {
    fn handle(&self, event: &Event) {
        let Some(validator) = self.validator.get() else {
            return;
        };
        match event {
            Event::SessionStarted { .. } => {
                self.started_states.lock().unwrap().push(validator.state());
            }
            Event::Completed { .. } => {
                self.busy_on_completed.lock().unwrap().push(validator.is_busy());
                let mut restarted = self.restarted.lock().unwrap();
                if restarted.is_none() {
                    let again = validator.start(
                        Vec::new(),
                        ProbeTimeout::default(),
                        Arc::new(NullEventHandler),
                    );
                    *restarted = Some(again.is_ok());
                }
            }
            _ => {}
        }
    }
}

#[test]
fn test_handler_may_call_validator_from_events() {
    for targets in [Vec::new(), paths(&["a.mp4"])] {
        let validator = Arc::new(BatchValidator::new(Arc::new(ScriptedRunner::default()), 1));
        let handler = Arc::new(ReentrantHandler::default());
        assert!(handler.validator.set(Arc::clone(&validator)).is_ok());

        let (done_tx, done_rx) = mpsc::channel();
        let worker_validator = Arc::clone(&validator);
        let worker_handler = Arc::clone(&handler);
        thread::spawn(move || {
            let summary = worker_validator
                .start(targets, ProbeTimeout::default(), worker_handler)
                .map(|handle| handle.wait());
            let _ = done_tx.send(summary.is_ok());
        });

        let started = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("start must not block on re-entrant handlers");
        assert!(started);
        assert_eq!(*handler.started_states.lock().unwrap(), vec![SessionState::Running]);
        assert_eq!(*handler.busy_on_completed.lock().unwrap(), vec![false]);
        assert_eq!(*handler.restarted.lock().unwrap(), Some(true));
        assert_eq!(validator.state(), SessionState::Completed);
    }
}

#[test]
fn test_empty_directory_is_nothing_to_check() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    create_dummy_file(dir.path(), "readme.txt");
    let validator = BatchValidator::new(Arc::new(ScriptedRunner::default()), 2);
    let recorder = Arc::new(Recorder::default());

    let config = CheckConfig::new(dir.path().to_path_buf());
    let summary = start_directory_check(&validator, &config, recorder.clone())?.wait();

    assert!(summary.nothing_to_check());
    assert!(!summary.cancelled);
    assert_eq!(recorder.completed_count(), 1);
    Ok(())
}

#[test]
fn test_busy_validator_rejects_directory_check() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    create_dummy_file(dir.path(), "a.mp4");
    let runner = ScriptedRunner::default().with("/held.mp4", 5_000, ProbeOutcome::Playable);
    let validator = BatchValidator::new(Arc::new(runner), 1);

    let held = validator.start(
        paths(&["/held.mp4"]),
        ProbeTimeout::default(),
        Arc::new(NullEventHandler),
    )?;
    let config = CheckConfig::new(dir.path().to_path_buf());
    let result = start_directory_check(&validator, &config, Arc::new(NullEventHandler));
    assert!(matches!(result, Err(CoreError::SessionActive)));

    held.cancel();
    held.wait();
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_directory_scenario_with_fake_decoder() -> Result<(), Box<dyn std::error::Error>> {
    use common::write_fake_decoder;
    use vidcheck_core::external::FrameProbe;

    let dir = tempdir()?;
    let bin = tempdir()?;
    let decoder = write_fake_decoder(
        bin.path(),
        "ffmpeg",
        "case \"$INPUT\" in\n  \
           *b.mkv) echo \"$INPUT: Invalid data found when processing input\" >&2; exit 1 ;;\n  \
           *c.avi) exec sleep 30 ;;\n  \
           *) exit 0 ;;\n\
         esac",
    );
    for name in ["a.mp4", "b.mkv", "c.avi", "d.txt"] {
        create_dummy_file(dir.path(), name);
    }

    let mut config = CheckConfig::new(dir.path().to_path_buf());
    config.timeout = ProbeTimeout::from_secs(3)?;
    config.jobs = 3;
    let validator = BatchValidator::new(Arc::new(FrameProbe::new(&decoder)), config.jobs);
    let recorder = Arc::new(Recorder::default());

    let summary = start_directory_check(&validator, &config, recorder.clone())?.wait();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.checked, 3);
    assert_eq!(summary.progress_percent(), 100.0);
    let mut names: Vec<String> = summary.failures.iter().map(|f| f.file_name()).collect();
    names.sort();
    assert_eq!(names, vec!["b.mkv", "c.avi"]);
    assert_eq!(summary.timed_out_count(), 1);
    assert!(
        summary
            .failures
            .iter()
            .any(|f| f.file_name() == "b.mkv" && !f.timed_out())
    );
    Ok(())
}
