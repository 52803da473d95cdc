//! Command enum for the presentation state actor
//!
//! Mutations are fire-and-forget; joins and snapshots carry a oneshot
//! channel for the reply.

use tokio::sync::{broadcast, oneshot};

use super::types::{PresentationState, StateMutation};
use crate::hub::ServerEvent;

/// What a newly joined session gets back from the actor
#[derive(Debug)]
pub struct Joined {
    /// Full state at the moment of joining
    pub snapshot: PresentationState,
    /// Subscription taken at the same instant as `snapshot`
    pub events: broadcast::Receiver<ServerEvent>,
}

/// Commands for the presentation state actor
///
/// # Hot Path Commands
///
/// - `Apply`: mutate the state and broadcast the result
///
/// # Request-Response Commands
///
/// - `Join`: snapshot plus event subscription for a new session
/// - `Snapshot`: read the current state
pub enum StateCommand {
    /// Apply a mutation and broadcast the full resulting state
    Apply(StateMutation),

    /// Register a session
    ///
    /// The snapshot and the subscription are taken while the actor holds the
    /// state, so no update can slip in between them.
    Join {
        /// Response channel
        response: oneshot::Sender<Joined>,
    },

    /// Get the current state
    Snapshot {
        /// Response channel
        response: oneshot::Sender<PresentationState>,
    },

    /// Gracefully shut down the state actor
    Shutdown,
}

impl std::fmt::Debug for StateCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateCommand::Apply(mutation) => f.debug_tuple("Apply").field(mutation).finish(),
            StateCommand::Join { .. } => f.debug_struct("Join").finish_non_exhaustive(),
            StateCommand::Snapshot { .. } => f.debug_struct("Snapshot").finish_non_exhaustive(),
            StateCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}
