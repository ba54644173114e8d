//! Outbound row events for the rendering layer

use parking_lot::Mutex;

use crate::model::{RowKind, RowPath};

/// Effect of a Model Store mutation, as seen by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent {
    /// A row was appended as the last child of `parent`
    RowAppended {
        parent: RowPath,
        path: RowPath,
        label: String,
        summary: String,
        is_leaf_marker: bool,
        kind: RowKind,
    },

    /// Every descendant of `path` was removed
    SubtreeRemoved { path: RowPath },

    /// The whole tree was torn down
    Cleared,
}

/// Trait for components that mirror the tree into widgets
pub trait TreeSubscriber: Send + Sync {
    /// Called after each store mutation
    fn on_row_event(&self, event: &RowEvent);
}

/// Subscriber that records every event it sees
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<RowEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded events, leaving the log empty
    pub fn drain(&self) -> Vec<RowEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl TreeSubscriber for EventLog {
    fn on_row_event(&self, event: &RowEvent) {
        self.events.lock().push(event.clone());
    }
}
