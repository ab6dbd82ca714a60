// vidcheck-cli/src/main.rs
//
// Entry point for the `vidcheck` binary: parses arguments, sets up logging and
// terminal styling, runs the selected command and turns its result into the
// process exit code.

use clap::Parser;
use std::process;

use vidcheck_cli::error::EXIT_ERROR;
use vidcheck_cli::logging::init_logging;
use vidcheck_cli::{Cli, Commands, run_check, terminal};
use vidcheck_core::{CoreError, config::TIMEOUT_GUIDANCE};

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        terminal::set_color(false);
    }

    let code = match cli.command {
        Commands::Check(args) => {
            match init_logging(cli.verbose, args.log_dir.as_deref()) {
                Ok(Some(log_path)) => log::info!("Writing log to {}", log_path.display()),
                Ok(None) => {}
                Err(e) => {
                    report_error(&e);
                    process::exit(EXIT_ERROR);
                }
            }
            match run_check(args) {
                Ok(code) => code,
                Err(e) => {
                    log::error!("{}", e);
                    report_error(&e);
                    EXIT_ERROR
                }
            }
        }
    };

    process::exit(code);
}

fn report_error(error: &CoreError) {
    let suggestion = match error {
        CoreError::InvalidTimeout(_) => Some(format!("Suggested timeout: {}", TIMEOUT_GUIDANCE)),
        CoreError::DependencyNotFound(_) => Some(
            "Install ffmpeg, or point --ffmpeg / VIDCHECK_FFMPEG at the binary".to_string(),
        ),
        CoreError::Directory { .. } => Some("Pass a readable directory".to_string()),
        _ => None,
    };
    let title = if error.is_input_error() {
        "Invalid input"
    } else {
        "Check failed"
    };
    terminal::print_error(title, &error.to_string(), suggestion.as_deref());
}
