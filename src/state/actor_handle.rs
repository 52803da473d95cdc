//! StateActorHandle - Public API for the StateActor
//!
//! Fire-and-forget methods for mutations, async methods with oneshot
//! channels for joins and snapshots.

use tokio::sync::{mpsc, oneshot};

use super::commands::{Joined, StateCommand};
use super::types::{PresentationState, StateMutation};

/// Handle for interacting with the StateActor
///
/// Cheap to clone; every session holds one.
#[derive(Clone)]
pub struct StateActorHandle {
    /// Command channel to the StateActor
    cmd_tx: mpsc::UnboundedSender<StateCommand>,
}

impl StateActorHandle {
    /// Create a new StateActorHandle with the given command sender
    pub fn new(cmd_tx: mpsc::UnboundedSender<StateCommand>) -> Self {
        Self { cmd_tx }
    }

    // =========================================================================
    // Hot path methods (fire-and-forget, no await)
    // =========================================================================

    /// Apply a mutation; the actor broadcasts the resulting state
    pub fn apply(&self, mutation: StateMutation) {
        let _ = self.cmd_tx.send(StateCommand::Apply(mutation));
    }

    // =========================================================================
    // Query methods (async with response)
    // =========================================================================

    /// Join as a new session: current snapshot plus event subscription
    ///
    /// Returns None if the actor has shut down.
    pub async fn join(&self) -> Option<Joined> {
        let (response_tx, response_rx) = oneshot::channel();

        if self
            .cmd_tx
            .send(StateCommand::Join {
                response: response_tx,
            })
            .is_err()
        {
            return None;
        }

        response_rx.await.ok()
    }

    /// Current state, or None if the actor has shut down
    pub async fn snapshot(&self) -> Option<PresentationState> {
        let (response_tx, response_rx) = oneshot::channel();

        if self
            .cmd_tx
            .send(StateCommand::Snapshot {
                response: response_tx,
            })
            .is_err()
        {
            return None;
        }

        response_rx.await.ok()
    }

    // =========================================================================
    // Lifecycle methods
    // =========================================================================

    /// Check if the actor is still alive
    pub fn is_alive(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    /// Signal the actor to shut down gracefully
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(StateCommand::Shutdown);
    }
}
