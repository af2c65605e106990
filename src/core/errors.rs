//! Shared error types for the engine

use thiserror::Error;

/// Main error type for smellmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Source text failed to parse; fatal for the run
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Malformed input tree; fatal for the run, no partial report
    #[error("Structural error: {0}")]
    Structural(String),

    /// A threshold outside its valid domain; the run is rejected
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
