//! Events emitted by the [`QueueSynchronizer`](crate::synchronizer::QueueSynchronizer).

use crate::queue::QueueStatus;
use crate::reconnect::DisconnectReason;

/// A change observed by the synchronizer.
///
/// Events arrive on the bounded receiver returned from
/// [`QueueSynchronizer::start`](crate::synchronizer::QueueSynchronizer::start).
/// For the current state rather than a history, use
/// [`subscribe`](crate::synchronizer::QueueSynchronizer::subscribe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// The push channel is up.
    Connected,
    /// An authoritative list replaced the queue (push event or fetch).
    QueueUpdated { players: Vec<String> },
    /// The queue status changed (loading, ready, or an error banner).
    StatusChanged(QueueStatus),
    /// The push channel went down.
    Disconnected { reason: DisconnectReason },
    /// A budgeted reconnection attempt is starting.
    Reconnecting {
        attempt: u32,
        attempts_remaining: u32,
    },
    /// The push channel came back after a drop.
    Reconnected,
    /// The reconnection budget is spent. No more automatic retries.
    ReconnectFailed,
}
