//! Error types for rn4020-client.

use std::time::Duration;

use thiserror::Error;

/// Main error type for all RN4020 operations.
#[derive(Debug, Error)]
pub enum Rn4020Error {
    /// Read or write failure on the byte source/sink.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Serial port could not be opened or configured.
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The module did not answer before the response deadline.
    #[error("Timed out after {waited:?} waiting for response to `{command}`")]
    Timeout { command: String, waited: Duration },

    /// Invalid configuration value, reported before anything is sent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration document could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel used out of order (e.g. send while a command is outstanding).
    #[error("Invalid channel state: {0}")]
    InvalidState(String),

    /// Module answered with something we cannot interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using Rn4020Error.
pub type Result<T> = std::result::Result<T, Rn4020Error>;
