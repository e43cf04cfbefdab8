//! Error types for the chat stream.

use thiserror::Error;

/// Main error type for stream operations.
///
/// The mutation path itself never fails: unknown update tags, edits for
/// unknown ids and timers firing for removed entries are all no-ops.
/// These errors only surface at the edges (frame decoding, configuration,
/// adapter subscription and runner control).
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Feed has no live subscriber")]
    Disconnected,
}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        StreamError::Decode(e.to_string())
    }
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
