//! Validation events and the handlers that consume them.
//!
//! The batch validator pushes an [`Event`] for every state change that a front
//! end may want to show: session start, each completed probe, each failure as
//! soon as it is found, and the final summary. Handlers are plain observers;
//! they run on the validator's worker threads and must not block for long.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::external::ProbeFailure;
use crate::validator::ValidationSummary;

pub mod json_handler;

pub use json_handler::JsonEventHandler;

#[derive(Debug, Clone)]
pub enum Event {
    /// A session was started over `total` files.
    SessionStarted { total: usize, timeout_secs: f64, jobs: usize },

    /// One more file was probed.
    Progress {
        checked: usize,
        total: usize,
        percent: f32,
    },

    /// A file failed its probe. Sent before the matching `Progress` event.
    FailureDetected { failure: ProbeFailure },

    /// Cancellation was requested; in-flight probes are being stopped.
    CancelRequested,

    /// The session finished (normally or after cancellation). Sent exactly once.
    Completed { summary: ValidationSummary },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for EventDispatcher {
    fn handle(&self, event: &Event) {
        for handler in &self.handlers {
            handler.handle(event);
        }
    }
}

/// Handler that ignores every event.
#[derive(Debug, Clone, Default)]
pub struct NullEventHandler;

impl EventHandler for NullEventHandler {
    fn handle(&self, _event: &Event) {}
}

/// Forwards events into an mpsc channel, turning the callbacks into a stream
/// that a UI thread can drain at its own pace.
///
/// Send errors (receiver dropped) are ignored.
#[derive(Debug, Clone)]
pub struct ChannelEventHandler {
    sender: Sender<Event>,
}

impl ChannelEventHandler {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { sender }
    }
}

impl EventHandler for ChannelEventHandler {
    fn handle(&self, event: &Event) {
        let _ = self.sender.send(event.clone());
    }
}
