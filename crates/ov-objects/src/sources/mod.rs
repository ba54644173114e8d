pub mod json_source;

pub use json_source::JsonNode;

use thiserror::Error;

/// Errors that can occur while loading an object source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
