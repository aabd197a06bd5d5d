//! Error types for the kestrel-ml engine

use thiserror::Error;

/// Result type alias for kestrel operations
pub type Result<T> = std::result::Result<T, KestrelError>;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum KestrelError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Stale handle: slot {index} generation {generation} is no longer live")]
    StaleHandle { index: u32, generation: u32 },

    #[error("Wrong model kind: expected {expected}, got {actual}")]
    WrongModelKind {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for KestrelError {
    fn from(err: serde_json::Error) -> Self {
        KestrelError::SerializationError(err.to_string())
    }
}
