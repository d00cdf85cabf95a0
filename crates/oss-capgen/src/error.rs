//! Error types for capability generation.

use thiserror::Error;

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors that can occur while emitting generated artifacts.
#[derive(Error, Debug)]
pub enum GenError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The plugin manifest is missing or unusable
    #[error("Manifest error: {0}")]
    Manifest(String),
}
