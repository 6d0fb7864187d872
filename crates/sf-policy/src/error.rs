// error.rs — Error types for the policy subsystem.
//
// Evaluation itself never fails: every aggregation degrades to a defined
// default. These errors only cover loading and validating configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring a decision coordinator.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy configuration file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy configuration is not valid YAML for `PolicyConfig`.
    #[error("failed to parse policy config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// The policy configuration could not be serialized.
    #[error("failed to serialize policy config: {0}")]
    SerializeError(serde_yaml::Error),

    /// A threshold lies outside `[0, 1]`.
    #[error("threshold '{name}' must be within [0, 1], got {value}")]
    InvalidThreshold { name: String, value: f64 },

    /// A weight is out of range (value weights must be > 0, category weights >= 0).
    #[error("invalid weight for '{name}': {value}")]
    InvalidWeight { name: String, value: f64 },
}
