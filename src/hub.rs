//! Event hub - fan-out of server events to every connected session
//!
//! Wraps a `tokio::sync::broadcast` channel. Each session holds its own
//! receiver, so publishing never waits on any individual client: a slow
//! session lags and skips ahead, a closed one simply drops its receiver.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::songs::SongRecord;
use crate::state::PresentationState;

/// Default number of buffered events per session before it starts lagging
pub const DEFAULT_HUB_CAPACITY: usize = 64;

/// Messages pushed from the server to clients
///
/// Serialized as `{"event": "state-update", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full presentation state snapshot
    StateUpdate(PresentationState),
    /// Full song library
    SongsList(Vec<SongRecord>),
}

impl ServerEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::StateUpdate(_) => "state-update",
            ServerEvent::SongsList(_) => "songs-list",
        }
    }
}

/// Cloneable publisher for [`ServerEvent`]s
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    /// Create a hub buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of sessions that will see it. Having no subscribers
    /// is not an error.
    pub fn publish(&self, event: ServerEvent) -> usize {
        let name = event.name();
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(event = name, receivers = delivered, "Event published");
        delivered
    }

    /// Register a new session
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Number of connected sessions
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}
