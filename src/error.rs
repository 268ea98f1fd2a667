//! Error types for Smile Flux

use thiserror::Error;

/// Errors that can occur around scoring: parsing frames, loading config,
/// encoding reports.
///
/// The scoring core never produces one of these; a frame that cannot be
/// scored is reported as a skip, not an error.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse frame record: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scorer configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] ValidationError),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Reasons a frame record fails validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Non-finite coordinate at point {index}")]
    NonFinitePoint { index: usize },

    #[error("Face bounding box must have finite position and positive size")]
    InvalidBoundingBox,

    #[error("Frame index {index} leaves no room for a following frame")]
    FrameIndexOutOfRange { index: u64 },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, ComputeError>;
