// vidcheck-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vidcheck_core::config::{DECODER_ENV_VAR, DEFAULT_TIMEOUT_SECS};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vidcheck: Video playability checker",
    long_about = "Decodes the first frame of every video in a directory with ffmpeg and reports the files that cannot be played."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Checks every video file in a directory
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Directory containing the videos (not searched recursively)
    #[arg(required = true, value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Per-file timeout in seconds (1-60). Suggested: 3-10s; tens of MB >= 3; hundreds of MB >= 5; several GB >= 10
    // Range is checked by the core config so the error carries the guidance text.
    #[arg(short, long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Number of files probed at once (default: CPU count, at most 4)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Path to the ffmpeg binary
    #[arg(long = "ffmpeg", value_name = "PATH", env = DECODER_ENV_VAR)]
    pub ffmpeg: Option<PathBuf>,

    /// Print one JSON object per event instead of the progress display
    #[arg(long)]
    pub json: bool,

    /// Optional: Directory for a timestamped log file of the run
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}
