//! Client errors.
//!
//! Transport failures surface at the call that caused them (`save`, `load`,
//! `upload`, `download`) and are never retried here.

use telesync_core::TelesyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Validation failure from the change tracker
    #[error(transparent)]
    Core(#[from] TelesyncError),

    /// The hub answered with a non-success status
    #[error("Request failed (code={status}): {body}")]
    Service { status: u16, body: String },

    /// The request never got an answer
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The channel's writer task has stopped
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Status code of a service error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Core(TelesyncError::Json(e))
    }
}
