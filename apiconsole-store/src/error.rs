//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown settings key.
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

