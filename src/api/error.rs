use http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Message shown when the server gives no usable reason.
pub const FALLBACK_MESSAGE: &str = "Network Error or Server Down";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("connection failed: {0}")]
    Network(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("server returned {status}: {}", message.as_deref().unwrap_or(FALLBACK_MESSAGE))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text for the user-facing notification.
    ///
    /// Only a server-supplied `{"error": ...}` message is surfaced verbatim;
    /// everything else collapses to the generic fallback.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Server { message: Some(message), .. } => message,
            _ => FALLBACK_MESSAGE,
        }
    }
}
