// ============================================================================
// vidcheck-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and file logging for the CLI
//
// Console logging goes through env_logger (RUST_LOG is honoured; --verbose
// raises the default from error to debug). With --log-dir the run is also written to a
// timestamped file, in which case fern drives both outputs.
//
// AI-ASSISTANT-INFO: Logging initialisation and helper functions

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::error::{CliErrorContext, CliResult};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// File name of the log for a run started now.
pub fn run_log_file_name() -> String {
    format!("vidcheck_run_{}.log", get_timestamp())
}

fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    }
}

/// Initialises logging. Returns the log file path when one was created.
///
/// Safe to call once per process; later calls leave the first logger in place.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);

    let Some(log_dir) = log_dir else {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format(|buf, record| {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            })
            .try_init();
        return Ok(None);
    };

    fs::create_dir_all(log_dir).cli_with_context(|| {
        format!("Failed to create log directory '{}'", log_dir.display())
    })?;
    let log_path = log_dir.join(run_log_file_name());
    let log_file = fern::log_file(&log_path)
        .cli_with_context(|| format!("Failed to create log file '{}'", log_path.display()))?;

    let console = fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .chain(std::io::stderr());

    // The file always receives info and above, with timestamps.
    let file = fern::Dispatch::new()
        .level(level.max(LevelFilter::Info))
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(log_file);

    if fern::Dispatch::new().chain(console).chain(file).apply().is_err() {
        log::debug!("Logger already initialised; keeping the existing one");
    }
    Ok(Some(log_path))
}
