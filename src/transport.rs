//! Transport abstraction for the queue push channel.
//!
//! The [`Transport`] trait is a bidirectional text message channel between the
//! client and the backend. Every message is one complete JSON envelope, so
//! implementations must handle framing internally (WebSocket frames,
//! length-prefixed TCP, an in-process channel in tests, ...).
//!
//! A [`Connector`] produces fresh transports. The synchronizer owns exactly one
//! connector and asks it for a new transport each time the push channel has to
//! be (re)opened, so there is no ambient global connection and tests can hand in
//! doubles.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use queue_dashboard::error::DashboardError;
//! use queue_dashboard::transport::{Connector, Transport};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), DashboardError> {
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, DashboardError>> {
//!         // Return None when the server closed the connection cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), DashboardError> {
//!         todo!()
//!     }
//! }
//!
//! struct MyConnector;
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     type Transport = MyTransport;
//!
//!     async fn connect(&mut self) -> Result<MyTransport, DashboardError> {
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::DashboardError;

/// A bidirectional text message transport for the push channel.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is used
/// inside `tokio::select!`. If `recv` is cancelled before completion, calling it
/// again must not lose data.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::TransportSend`] if the message could not be sent.
    async fn send(&mut self, message: String) -> Result<(), DashboardError>;

    /// Receive the next JSON text message from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete message was received
    /// - `Some(Err(e))`: the channel errored; the synchronizer treats this as
    ///   an unexpected drop and counts reconnects against its budget
    /// - `None`: the server closed the connection on purpose; the
    ///   synchronizer reconnects immediately without consuming budget
    async fn recv(&mut self) -> Option<Result<String, DashboardError>>;

    /// Close the transport connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations should
    /// still release resources.
    async fn close(&mut self) -> Result<(), DashboardError>;
}

/// Opens push-channel transports on demand.
///
/// Called once at startup and once per reconnection attempt. The synchronizer
/// applies its own per-attempt timeout around [`connect`](Connector::connect).
#[async_trait]
pub trait Connector: Send + 'static {
    /// The transport type produced by this connector.
    type Transport: Transport;

    /// Open a new connection.
    ///
    /// # Errors
    ///
    /// Returns any error that prevented the connection from being established.
    async fn connect(&mut self) -> Result<Self::Transport, DashboardError>;
}
