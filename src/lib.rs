//! # Queue Dashboard
//!
//! Client-side core of a community gaming dashboard: a player queue kept in
//! sync with a backend over a push channel, and a deterministic selector wheel.
//!
//! ## Features
//!
//! - **Push-synchronized queue**: [`QueueSynchronizer`] applies every
//!   `queue_updated` broadcast wholesale and reconnects with a bounded budget
//! - **Transport-agnostic**: implement [`Transport`] and [`Connector`] for any
//!   bidirectional text channel
//! - **WebSocket built-in**: the default `transport-websocket` feature provides
//!   `WebSocketTransport` and `WebSocketConnector`
//! - **REST bindings**: the default `http-client` feature provides `HttpBackend`
//!   for the queue, search, leaderboard, stats, and scores endpoints
//! - **Selector wheel**: [`Wheel`] is a pure spin state machine and
//!   [`WheelAnimator`] plays it on the tokio clock
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use queue_dashboard::{HttpBackend, QueueEvent, QueueSyncConfig, QueueSynchronizer, WebSocketConnector};
//!
//! let api = HttpBackend::new("http://localhost:5000");
//! let connector = WebSocketConnector::new("ws://localhost:5000/ws");
//! let (sync, mut events) = QueueSynchronizer::start(api, connector, QueueSyncConfig::default());
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

pub mod animation;
pub mod api;
pub mod error;
pub mod event;
pub mod highlight;
#[cfg(feature = "http-client")]
pub mod http;
pub mod protocol;
pub mod queue;
pub mod reconnect;
pub mod synchronizer;
pub mod transport;
pub mod transports;
pub mod wheel;

// Re-export primary types for ergonomic imports.
pub use animation::{WheelAnimator, WheelEvent};
pub use api::QueueApi;
pub use error::{DashboardError, Result};
pub use event::QueueEvent;
pub use highlight::{SeriesHighlights, SeriesStyle};
#[cfg(feature = "http-client")]
pub use http::HttpBackend;
pub use protocol::{ClientMessage, ServerMessage};
pub use queue::{QueueState, QueueStatus};
pub use reconnect::{ConnectionPhase, ConnectionState, DisconnectReason};
pub use synchronizer::{QueueSyncConfig, QueueSynchronizer};
pub use transport::{Connector, Transport};
#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
pub use wheel::{Resolution, SpinParams, Wheel, WheelConfig};
