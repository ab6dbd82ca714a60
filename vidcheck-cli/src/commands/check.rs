//! Implementation of the 'check' subcommand.
//!
//! Builds the configuration, verifies the decoder, starts a session on the
//! core validator and renders its events until the session completes. Ctrl-C
//! cancels the session instead of killing the process, so in-flight decoders
//! are reaped and a partial summary is still printed.

use crate::cli::CheckArgs;
use crate::error::{CliResult, exit_code_for};
use crate::terminal::{self, CheckProgress};

use vidcheck_core::config::CheckConfigBuilder;
use vidcheck_core::events::{ChannelEventHandler, Event, EventDispatcher, JsonEventHandler};
use vidcheck_core::{BatchValidator, CheckConfig, ValidationSummary, check_dependency};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use log::{debug, info, warn};

/// How often the event loop wakes up to look for Ctrl-C.
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// Builds the core configuration from the command-line arguments.
pub fn build_config(args: &CheckArgs) -> CliResult<CheckConfig> {
    let mut builder = CheckConfigBuilder::new()
        .directory(args.directory.clone())
        .timeout_secs(args.timeout);
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        builder = builder.decoder_path(ffmpeg.clone());
    }
    builder.build()
}

/// Installs a Ctrl-C handler that raises `flag`.
fn install_interrupt_handler(flag: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    });
    if let Err(e) = result {
        warn!("Could not install Ctrl-C handler: {}", e);
    }
}

/// Runs the check and returns the process exit code.
pub fn run_check(args: CheckArgs) -> CliResult<i32> {
    let config = build_config(&args)?;
    debug!("Using decoder {}", config.decoder_path.display());
    check_dependency(&config.decoder_path)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(Arc::clone(&interrupted));

    let (tx, rx) = mpsc::channel();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_handler(Arc::new(ChannelEventHandler::new(tx)));
    if args.json {
        dispatcher.add_handler(Arc::new(JsonEventHandler::new()));
    }

    let validator = BatchValidator::from_config(&config);
    let handle = vidcheck_core::start_directory_check(&validator, &config, Arc::new(dispatcher))?;
    info!(
        "Started check of {} ({} file(s))",
        config.directory.display(),
        handle.total()
    );

    let mut progress: Option<CheckProgress> = None;
    let mut cancel_sent = false;
    loop {
        if !cancel_sent && interrupted.load(Ordering::SeqCst) {
            cancel_sent = true;
            if let Some(progress) = &progress {
                progress.println(
                    &console::style("Interrupted; stopping running probes...")
                        .yellow()
                        .to_string(),
                );
            }
            validator.cancel(&handle);
        }

        match rx.recv_timeout(INTERRUPT_POLL) {
            Ok(Event::SessionStarted {
                total,
                timeout_secs,
                jobs,
            }) => {
                if !args.json && total > 0 {
                    terminal::print_run_header(&config.directory, total, timeout_secs, jobs);
                    progress = Some(CheckProgress::new(total, !console::Term::stderr().is_term()));
                }
            }
            Ok(Event::Progress { checked, .. }) => {
                if let Some(progress) = &progress {
                    progress.set_checked(checked);
                }
            }
            Ok(Event::FailureDetected { failure }) => {
                if let Some(progress) = &progress {
                    progress.println(&terminal::format_failure(&failure));
                }
            }
            Ok(Event::CancelRequested) => {}
            Ok(Event::Completed { .. }) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    if let Some(progress) = &progress {
        progress.finish();
    }
    let summary = handle.wait();
    if !args.json {
        report(&summary);
    }
    Ok(exit_code_for(&summary))
}

fn report(summary: &ValidationSummary) {
    if summary.nothing_to_check() {
        terminal::print_warning("No video files found; nothing to check");
        return;
    }
    terminal::print_summary(summary);
}
