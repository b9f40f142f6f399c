//! # Error Types
//!
//! Custom error types for Angle Link using `thiserror`.

use thiserror::Error;

/// Main error type for Angle Link
#[derive(Debug, Error)]
pub enum AngleLinkError {
    /// Frame protocol errors
    #[error("Frame protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Sampling schedule errors
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Telemetry log errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

/// Result type alias for Angle Link
pub type Result<T> = std::result::Result<T, AngleLinkError>;
