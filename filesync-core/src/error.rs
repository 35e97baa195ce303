//! Error types for filesync-core.

use thiserror::Error;

/// All errors that can arise while resolving configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable was unset or empty.
    #[error("env variable {key} is empty")]
    Missing { key: &'static str },

    /// A variable was present but could not be interpreted.
    #[error("{key} is in unexpected format: {value}")]
    Malformed { key: &'static str, value: String },
}
