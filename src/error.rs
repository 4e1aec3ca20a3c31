//! Error types for the dialogue router

use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {

    // =============================
    // Core Routing Errors
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend failure: {0}")]
    BackendFailure(String),

    #[error("State corruption: {0}")]
    StateCorruption(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}
