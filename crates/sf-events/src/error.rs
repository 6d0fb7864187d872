// error.rs — Error types for event observers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors an observer can report. The dispatcher logs them and moves on.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// An observer-specific failure (e.g. an unreachable alert channel).
    #[error("observer error: {0}")]
    ObserverError(String),
}
