//! Utility functions for formatting progress and timings.

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use] pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Share of `done` in `total` as a percentage. An empty batch counts as 100%.
#[must_use] pub fn percent_complete(done: usize, total: usize) -> f32 {
    if total == 0 {
        return 100.0;
    }
    (done.min(total) as f64 * 100.0 / total as f64) as f32
}
