//! Error types for the queue dashboard client.

use thiserror::Error;

/// Shown when the initial (or a manual) queue fetch fails.
pub const FETCH_QUEUE_FAILED: &str = "Failed to fetch queue.";

/// Shown when an add-player submission fails without a structured server error.
pub const ADD_PLAYER_FAILED: &str = "Failed to add player to the queue.";

/// Shown while the push channel is down.
pub const CHANNEL_FAILED: &str = "WebSocket connection failed.";

/// Errors that can occur when using the queue dashboard client.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The request never produced a usable response from the backend.
    #[error("network error: {0}")]
    Network(String),

    /// Input was rejected locally before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend answered with a non-2xx status and a structured `error` message.
    #[error("server rejected request ({status}): {message}")]
    ServerRejection {
        /// HTTP status code of the response.
        status: u16,
        /// The backend's `error` field, verbatim.
        message: String,
    },

    /// The push channel failed to connect or dropped.
    #[error("push channel error: {0}")]
    Channel(String),

    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a protocol message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The synchronizer's background loop is no longer running.
    #[error("synchronizer is not running")]
    NotRunning,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// The message a dashboard should show for this error.
    ///
    /// Server rejections and validation failures are passed through verbatim.
    /// Transport failures map to the channel banner, and everything else to
    /// `fallback` (e.g. [`ADD_PLAYER_FAILED`]).
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            Self::ServerRejection { message, .. } | Self::Validation(message) => message.clone(),
            Self::Channel(_)
            | Self::TransportSend(_)
            | Self::TransportReceive(_)
            | Self::TransportClosed => CHANNEL_FAILED.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// A specialized [`Result`] type for queue dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
