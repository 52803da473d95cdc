//! StateActor - single owner of the presentation state
//!
//! Every mutation from every session funnels through one command channel and
//! is applied in arrival order: read, modify, broadcast, then the next
//! command. This is the only serialization point for the shared document;
//! last applied wins.

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::actor_handle::StateActorHandle;
use super::commands::{Joined, StateCommand};
use super::types::{PresentationState, StateMutation};
use crate::hub::{EventHub, ServerEvent};

/// Actor owning the [`PresentationState`]
///
/// ```text
/// session ──┐                         ┌──► session (state-update)
/// session ──┼──► command_rx ─► apply ─┼──► session (state-update)
/// session ──┘                         └──► session (state-update)
/// ```
pub struct StateActor {
    /// The shared document
    state: PresentationState,

    /// Fan-out to every session
    hub: EventHub,

    /// Receiver for incoming commands
    command_rx: mpsc::UnboundedReceiver<StateCommand>,

    /// Counter for tracking total mutations processed
    update_count: u64,
}

impl StateActor {
    /// Spawn a new StateActor starting from the default state
    pub fn spawn(hub: EventHub) -> StateActorHandle {
        Self::spawn_with_state(hub, PresentationState::default())
    }

    /// Spawn a new StateActor starting from `state`
    pub fn spawn_with_state(hub: EventHub, state: PresentationState) -> StateActorHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let actor = StateActor {
            state,
            hub,
            command_rx: cmd_rx,
            update_count: 0,
        };

        tokio::spawn(actor.run());

        info!("StateActor spawned");

        StateActorHandle::new(cmd_tx)
    }

    /// Main run loop: one command at a time until shutdown or all handles drop
    async fn run(mut self) {
        debug!("StateActor run loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            trace!(?cmd, "Processing command");

            match cmd {
                StateCommand::Apply(mutation) => {
                    self.handle_apply(mutation);
                }
                StateCommand::Join { response } => {
                    let joined = Joined {
                        events: self.hub.subscribe(),
                        snapshot: self.state.clone(),
                    };
                    let _ = response.send(joined);
                    debug!(sessions = self.hub.session_count(), "Session joined");
                }
                StateCommand::Snapshot { response } => {
                    let _ = response.send(self.state.clone());
                }
                StateCommand::Shutdown => {
                    info!("StateActor received shutdown command");
                    break;
                }
            }
        }

        info!(
            update_count = self.update_count,
            "StateActor run loop terminated"
        );
    }

    /// Apply a mutation and broadcast the whole resulting document.
    ///
    /// Broadcasts even when the mutation changed nothing (e.g. `next` on the
    /// last slide).
    fn handle_apply(&mut self, mutation: StateMutation) {
        let kind = mutation.kind();
        self.state.apply(mutation);
        self.update_count += 1;

        let delivered = self
            .hub
            .publish(ServerEvent::StateUpdate(self.state.clone()));

        debug!(
            kind,
            mode = %self.state.mode,
            sessions = delivered,
            "State updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::{BibleSlide, Direction, DisplayPatch, Lyrics, Mode};

    fn lyrics(slides: usize) -> Lyrics {
        Lyrics {
            title: "How Great Thou Art".to_string(),
            current_slide: 0,
            slides: (0..slides).map(|i| format!("verse {}", i + 1)).collect(),
        }
    }

    #[tokio::test]
    async fn test_join_receives_current_snapshot() {
        let handle = StateActor::spawn(EventHub::default());
        let joined = handle.join().await.unwrap();
        assert_eq!(joined.snapshot, PresentationState::default());
    }

    #[tokio::test]
    async fn test_mutation_is_broadcast_to_all_sessions() {
        let handle = StateActor::spawn(EventHub::default());
        let mut control = handle.join().await.unwrap().events;
        let mut display = handle.join().await.unwrap().events;

        handle.apply(StateMutation::SetLyrics(lyrics(3)));

        for rx in [&mut control, &mut display] {
            match rx.recv().await.unwrap() {
                ServerEvent::StateUpdate(state) => {
                    assert_eq!(state.mode, Mode::Lyrics);
                    assert_eq!(state.lyrics.slides.len(), 3);
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_late_joiner_gets_full_post_mutation_state() {
        let handle = StateActor::spawn(EventHub::default());
        let _first = handle.join().await.unwrap();

        handle.apply(StateMutation::SetBible(BibleSlide {
            book: "John".to_string(),
            chapter: "3".to_string(),
            verse: "16".to_string(),
            text: "For God so loved the world".to_string(),
        }));
        handle.apply(StateMutation::SetLyrics(lyrics(4)));
        handle.apply(StateMutation::NavigateLyrics(Direction::NEXT));
        handle.apply(StateMutation::NavigateLyrics(Direction::NEXT));
        handle.apply(StateMutation::SetDisplay(DisplayPatch {
            font_size: Some(60),
            theme: None,
        }));

        let mut second = handle.join().await.unwrap();
        let snapshot = second.snapshot;
        assert_eq!(snapshot.mode, Mode::Lyrics);
        assert_eq!(snapshot.bible.verse, "16");
        assert_eq!(snapshot.lyrics.current_slide, 2);
        assert_eq!(snapshot.display.font_size, 60);
        assert_eq!(snapshot.display.theme, "dark");

        // No replay of earlier mutations
        assert!(second.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_commands_applied_in_arrival_order() {
        let handle = StateActor::spawn(EventHub::default());

        handle.apply(StateMutation::SetMode(Mode::Bible));
        handle.apply(StateMutation::SetMode(Mode::Program));
        handle.apply(StateMutation::Clear);

        let state = handle.snapshot().await.unwrap();
        assert_eq!(state.mode, Mode::Welcome);
    }

    #[tokio::test]
    async fn test_navigation_from_seeded_state() {
        let mut seeded = PresentationState::default();
        seeded.apply(StateMutation::SetLyrics(Lyrics {
            current_slide: 2,
            ..lyrics(3)
        }));
        let handle = StateActor::spawn_with_state(EventHub::default(), seeded.clone());

        let joined = handle.join().await.unwrap();
        assert_eq!(joined.snapshot, seeded);

        handle.apply(StateMutation::NavigateLyrics(Direction::NEXT));
        let state = handle.snapshot().await.unwrap();
        assert_eq!(state.mode, Mode::Lyrics);
        assert_eq!(state.lyrics.current_slide, 2);
    }

    #[tokio::test]
    async fn test_noop_navigation_still_broadcasts() {
        let handle = StateActor::spawn(EventHub::default());
        let mut rx = handle.join().await.unwrap().events;

        handle.apply(StateMutation::NavigateLyrics(Direction::PREV));

        match rx.recv().await.unwrap() {
            ServerEvent::StateUpdate(state) => assert_eq!(state.lyrics.current_slide, 0),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_closes_actor() {
        let handle = StateActor::spawn(EventHub::default());
        handle.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!handle.is_alive());
        assert!(handle.snapshot().await.is_none());
    }
}
