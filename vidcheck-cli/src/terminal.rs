// ============================================================================
// vidcheck-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Sections, status lines and the check progress bar. Results go to stdout;
// the progress bar draws on stderr and is hidden when stderr is not a
// terminal. Lines printed while the bar is visible are routed through
// `suspend` so they never interleave with a redraw.
//
// AI-ASSISTANT-INFO: Terminal UI components and styling for the CLI

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

// ---- Standard library imports ----
use std::path::Path;
use std::time::Duration;

// ---- Internal crate imports ----
use vidcheck_core::{ProbeFailure, ProbeOutcome, ValidationSummary, format_duration};

// ============================================================================
// STYLING CONSTANTS
// ============================================================================

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const WARNING_SYMBOL: &str = "⚠";
    pub const TIMEOUT_SYMBOL: &str = "⧖";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";

    pub const PROGRESS_TEMPLATE: &str =
        "  Checking: {percent:>3}% [{bar:30}] {pos}/{len} ({elapsed})";
    pub const PROGRESS_CHARS: &str = "##.";
}

/// Enables or disables colored output on both streams.
pub fn set_color(enable: bool) {
    console::set_colors_enabled(enable);
    console::set_colors_enabled_stderr(enable);
}

// ============================================================================
// UI COMPONENTS
// ============================================================================

pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!(
            "{}{}{}",
            styling::SECTION_PREFIX,
            title,
            styling::SECTION_SUFFIX
        ))
        .cyan()
        .bold()
    );
}

/// Prints an indented `label: value` line; `highlight` makes the value bold.
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let value = if highlight {
        style(value).bold().to_string()
    } else {
        value.to_string()
    };
    println!("{}{:<14} {}", styling::STATUS_INDENT, format!("{}:", label), value);
}

pub fn print_success(message: &str) {
    println!(
        "{} {}",
        style(styling::SUCCESS_SYMBOL).green().bold(),
        style(message).green()
    );
}

pub fn print_warning(message: &str) {
    println!(
        "{} {}",
        style(styling::WARNING_SYMBOL).yellow().bold(),
        style(message).yellow()
    );
}

/// Prints an error block to stderr.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    eprintln!(
        "{} {}",
        style(styling::ERROR_SYMBOL).red().bold(),
        style(title).red().bold()
    );
    eprintln!("{}{}", styling::STATUS_INDENT, message);
    if let Some(suggestion) = suggestion {
        eprintln!("{}{}", styling::STATUS_INDENT, style(suggestion).dim());
    }
}

/// One line describing an unplayable file.
pub fn format_failure(failure: &ProbeFailure) -> String {
    match &failure.outcome {
        ProbeOutcome::TimedOut { after } => format!(
            "{} {} {}",
            style(styling::TIMEOUT_SYMBOL).yellow().bold(),
            style(failure.file_name()).bold(),
            style(format!("(no frame within {}s)", after.as_secs_f64())).yellow()
        ),
        ProbeOutcome::Unplayable { reason } => {
            let reason = first_line(reason);
            format!(
                "{} {} {}",
                style(styling::ERROR_SYMBOL).red().bold(),
                style(failure.file_name()).bold(),
                style(format!("({})", reason)).dim()
            )
        }
        ProbeOutcome::Playable => format!("{} {}", styling::SUCCESS_SYMBOL, failure.file_name()),
    }
}

// ffmpeg often repeats the same diagnostic; the first line is enough for a list.
fn first_line(reason: &str) -> &str {
    let line = reason.lines().next().unwrap_or("").trim();
    if line.is_empty() { "decoder failed" } else { line }
}

/// Prints the run header.
pub fn print_run_header(directory: &Path, total: usize, timeout_secs: f64, jobs: usize) {
    print_section("VIDEO CHECK");
    print_status("Directory", &directory.display().to_string(), false);
    print_status("Files", &total.to_string(), true);
    print_status("Timeout", &format!("{}s per file", timeout_secs), false);
    print_status("Workers", &jobs.to_string(), false);
    println!();
}

/// Prints the final summary block.
pub fn print_summary(summary: &ValidationSummary) {
    print_section("SUMMARY");
    print_status(
        "Checked",
        &format!("{} of {}", summary.checked, summary.total),
        true,
    );
    print_status("Unplayable", &summary.failures.len().to_string(), true);
    if summary.timed_out_count() > 0 {
        print_status("Timed out", &summary.timed_out_count().to_string(), false);
    }
    print_status(
        "Elapsed",
        &format_duration(summary.elapsed.as_secs_f64()),
        false,
    );

    if !summary.failures.is_empty() {
        println!();
        println!("{}", style("Files that could not be played:").bold());
        for failure in &summary.failures {
            println!("{}{}", styling::STATUS_INDENT, format_failure(failure));
            println!(
                "{}{}{}",
                styling::STATUS_INDENT,
                styling::STATUS_INDENT,
                style(failure.path.display()).dim()
            );
        }
    }

    println!();
    if summary.cancelled {
        print_warning(&format!(
            "Check cancelled after {} of {} file(s)",
            summary.checked, summary.total
        ));
    } else if summary.failures.is_empty() {
        print_success("All files are playable");
    } else {
        print_warning(&format!(
            "{} file(s) could not be played",
            summary.failures.len()
        ));
    }
}

// ============================================================================
// PROGRESS BAR
// ============================================================================

/// Progress display for a running check.
pub struct CheckProgress {
    bar: ProgressBar,
}

impl CheckProgress {
    /// Creates a bar for `total` files. `hidden` disables drawing entirely.
    pub fn new(total: usize, hidden: bool) -> Self {
        let bar = ProgressBar::new(total as u64);
        if hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            if let Ok(progress_style) = ProgressStyle::default_bar().template(styling::PROGRESS_TEMPLATE) {
                bar.set_style(progress_style.progress_chars(styling::PROGRESS_CHARS));
            }
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        Self { bar }
    }

    pub fn set_checked(&self, checked: usize) {
        self.bar.set_position(checked as u64);
    }

    /// Prints a line above the bar.
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| println!("{}", line));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
