//! Error types for teampulse-core

use thiserror::Error;

/// Main error type for the teampulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// A live provider credential is missing.
    ///
    /// Provider selection checks for this case up front and uses the
    /// deterministic provider instead, so it never reaches a user.
    #[error("provider not configured: {0}")]
    Configuration(String),

    /// The live provider is configured but a fetch failed
    #[error("provider error: {0}")]
    Provider(String),

    /// Employee not found in the provider directory
    #[error("employee not found: {0}")]
    EmployeeNotFound(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the live provider was simply not configured.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type alias for teampulse-core
pub type Result<T> = std::result::Result<T, Error>;
