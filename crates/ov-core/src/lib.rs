//! Core functionality for the object viewer
//!
//! This crate provides the display-row tree, the path->object side-table,
//! the outbound row events and the introspection capability set that the
//! lazy expander is written against.

pub mod events;
pub mod inspect;
pub mod model;
pub mod summary;

// Re-export commonly used types
pub use events::{EventLog, RowEvent, TreeSubscriber};
pub use inspect::{
    same_object, Capabilities, Capability, Inspect, InspectError, ObjectRef, SortKey,
};
pub use model::{
    Binding, DisplayRow, Materialization, ModelError, ModelStore, RowId, RowKind, RowPath,
};
pub use summary::{summarize, truncate_summary, ELLIPSIS, SUMMARY_BUDGET};
