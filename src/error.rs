//! Error types for the frontdesk gateway

use thiserror::Error;

/// Result type alias for frontdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the frontdesk gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Realtime transport error (connect/stream failures)
    #[error("transport error: {0}")]
    Transport(String),

    /// History summarization error
    #[error("summarization error: {0}")]
    Summarization(String),

    /// Usage log persistence error
    #[error("persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
