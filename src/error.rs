//! Error types for model interpretation

use thiserror::Error;

/// Result type alias for interpretation operations
pub type Result<T> = std::result::Result<T, InterpretError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Prediction failed: {0}")]
    PredictionFailure(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl From<polars::error::PolarsError> for InterpretError {
    fn from(err: polars::error::PolarsError) -> Self {
        InterpretError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for InterpretError {
    fn from(err: serde_json::Error) -> Self {
        InterpretError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for InterpretError {
    fn from(err: ndarray::ShapeError) -> Self {
        InterpretError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
