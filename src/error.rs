//! # Error Types
//!
//! Custom error types for the tracker using `thiserror`.

use thiserror::Error;

/// Main error type for the tracker
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Serial link errors (open, write, read)
    #[error("Serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Telemetry payload errors (capacity, identifier format)
    #[error("Payload error: {0}")]
    Payload(String),

    /// Step counter read errors
    #[error("Step counter error: {0}")]
    StepCounter(String),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the tracker
pub type Result<T> = std::result::Result<T, TrackerError>;
