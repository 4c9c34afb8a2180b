//! The REST seam used by the synchronizer.
//!
//! [`QueueApi`] covers the two queue endpoints. The synchronizer only talks to
//! the backend through this trait, so tests can swap in a double and other
//! HTTP stacks can be plugged in. [`HttpBackend`](crate::http::HttpBackend)
//! is the `reqwest` implementation.

use async_trait::async_trait;

use crate::error::{DashboardError, Result};

/// The queue half of the backend REST contract.
#[async_trait]
pub trait QueueApi: Send + Sync + 'static {
    /// `GET /api/queue`: the authoritative queue in order.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Network`] if the backend could not be reached, or
    /// [`DashboardError::ServerRejection`] for a non-2xx response.
    async fn fetch_queue(&self) -> Result<Vec<String>>;

    /// `POST /api/queue`: ask the backend to enqueue `player_name`.
    ///
    /// Returns the backend's confirmation message. `player_name` is already
    /// trimmed and non-empty.
    ///
    /// # Errors
    ///
    /// [`DashboardError::ServerRejection`] carries the backend's `error`
    /// verbatim (e.g. a duplicate name).
    async fn add_player(&self, player_name: &str) -> Result<String>;
}

/// Trim `input` and reject it if nothing is left.
///
/// # Errors
///
/// [`DashboardError::Validation`] with `message` when `input` is blank.
pub fn require_non_blank<'a>(input: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::Validation(message.to_string()));
    }
    Ok(trimmed)
}
