//! Error types for TSC

use thiserror::Error;

/// Main error type for TSC
#[derive(Error, Debug)]
pub enum TscError {
    #[error("Unknown reward function: {0}")]
    UnknownRewardFunction(String),

    #[error("Unknown baseline controller: {0}")]
    UnknownController(String),

    #[error("Invalid result key '{name}': {reason}")]
    InvalidResultKey { name: String, reason: String },

    #[error("No result files match: {0}")]
    NoSeriesFiles(String),

    #[error("Column '{column}' not found in {file}")]
    MissingColumn { file: String, column: String },

    #[error("Empty series: {0}")]
    EmptySeries(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl TscError {
    pub(crate) fn invalid_key(name: &str, reason: impl Into<String>) -> Self {
        TscError::InvalidResultKey {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for TSC operations
pub type Result<T> = std::result::Result<T, TscError>;
