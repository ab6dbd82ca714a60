//! JSON event handler for structured output
//!
//! Writes one JSON object per line for every validation event so that other
//! tools can follow a run without scraping terminal output.

use super::{Event, EventHandler};
use crate::error::CoreResult;
use crate::external::{ProbeFailure, ProbeOutcome};
use serde_json::{Value, json};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Event handler that outputs validation events as JSON lines
pub struct JsonEventHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventHandler {
    /// Create a new JSON event handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JSON event handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    fn write_json(&self, value: Value) {
        if let Err(e) = self.try_write(&value) {
            log::warn!("Failed to write JSON event: {}", e);
        }
    }

    fn try_write(&self, value: &Value) -> CoreResult<()> {
        let line = serde_json::to_string(value)?;
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(output, "{}", line)?;
        output.flush()?;
        Ok(())
    }
}

impl Default for JsonEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON form of a failure.
pub fn failure_to_json(failure: &ProbeFailure) -> Value {
    let mut value = json!({
        "file": failure.file_name(),
        "path": failure.path.to_string_lossy(),
        "outcome": failure.outcome.kind(),
    });
    match &failure.outcome {
        ProbeOutcome::Unplayable { reason } => {
            value["reason"] = json!(reason);
        }
        ProbeOutcome::TimedOut { after } => {
            value["timeout_seconds"] = json!(after.as_secs_f64());
        }
        ProbeOutcome::Playable => {}
    }
    value
}

impl EventHandler for JsonEventHandler {
    fn handle(&self, event: &Event) {
        let timestamp = chrono::Utc::now().to_rfc3339();

        let value = match event {
            Event::SessionStarted {
                total,
                timeout_secs,
                jobs,
            } => json!({
                "type": "session_started",
                "total_files": total,
                "timeout_seconds": timeout_secs,
                "jobs": jobs,
                "timestamp": timestamp
            }),
            Event::Progress {
                checked,
                total,
                percent,
            } => json!({
                "type": "progress",
                "checked": checked,
                "total": total,
                "percent": percent,
                "timestamp": timestamp
            }),
            Event::FailureDetected { failure } => json!({
                "type": "failure_detected",
                "failure": failure_to_json(failure),
                "timestamp": timestamp
            }),
            Event::CancelRequested => json!({
                "type": "cancel_requested",
                "timestamp": timestamp
            }),
            Event::Completed { summary } => json!({
                "type": "completed",
                "total": summary.total,
                "checked": summary.checked,
                "cancelled": summary.cancelled,
                "all_playable": summary.all_playable(),
                "elapsed_seconds": summary.elapsed.as_secs_f64(),
                "failures": summary.failures.iter().map(failure_to_json).collect::<Vec<_>>(),
                "timestamp": timestamp
            }),
        };

        self.write_json(value);
    }
}
