//! Lazy tree expansion over inspectable object graphs

pub mod classify;
pub mod config;
pub mod expander;
pub mod explorer;

// Re-exports
pub use classify::{accessor_key, classify_and_group, Buckets, FunctionGroup, Member};
pub use config::{ConfigError, ExpanderConfig};
pub use expander::{CollapseReport, Diagnostic, ExpandReport, LazyExpander};
pub use explorer::{Explorer, IntentOutcome, RowDetails, TreeIntent};
