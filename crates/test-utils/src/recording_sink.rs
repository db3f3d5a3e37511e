use std::sync::Mutex;

use buildcycle::events::{BuildEvent, EventSink};

/// Event sink that keeps every dispatched event.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<BuildEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, BuildEvent::Error { .. }))
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn dispatch(&self, event: BuildEvent) {
        self.events.lock().unwrap().push(event);
    }
}
