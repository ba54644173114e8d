//! Inspectable object sources for the object viewer

pub mod graph;
pub mod sample;
pub mod sources;

// Re-exports
pub use graph::{ArgSpec, Obj, Object, ObjectGraph, Payload};
pub use sample::sample_module;
pub use sources::{JsonNode, SourceError};
