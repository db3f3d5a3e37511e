// src/events.rs

//! Build lifecycle notifications.

use std::fmt;

use tracing::{debug, error};

/// Event name used for per-project segment execution.
pub const PROJECT_EXECUTION: &str = "project-execute";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Start { event: String, target: String },
    End { event: String, target: String },
    Error { event: String, target: String, message: String },
}

impl BuildEvent {
    pub fn target(&self) -> &str {
        match self {
            BuildEvent::Start { target, .. }
            | BuildEvent::End { target, .. }
            | BuildEvent::Error { target, .. } => target,
        }
    }
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildEvent::Start { event, target } => write!(f, "start {event}: {target}"),
            BuildEvent::End { event, target } => write!(f, "end {event}: {target}"),
            BuildEvent::Error {
                event,
                target,
                message,
            } => write!(f, "error {event}: {target}: {message}"),
        }
    }
}

/// Receives start/end/error notifications for every project segment.
pub trait EventSink {
    fn dispatch(&self, event: BuildEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn dispatch(&self, event: BuildEvent) {
        match &event {
            BuildEvent::Error { .. } => error!(target: "buildcycle::events", "{event}"),
            _ => debug!(target: "buildcycle::events", "{event}"),
        }
    }
}
