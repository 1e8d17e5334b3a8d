//! Gateway error types.

use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Audit log I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (client writer task has gone away).
    #[error("Channel send error")]
    ChannelSend,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<tokio::sync::mpsc::error::SendError<axum::extract::ws::Message>> for GatewayError {
    fn from(_: tokio::sync::mpsc::error::SendError<axum::extract::ws::Message>) -> Self {
        GatewayError::ChannelSend
    }
}

impl From<axum::Error> for GatewayError {
    fn from(e: axum::Error) -> Self {
        GatewayError::WebSocket(e.to_string())
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
