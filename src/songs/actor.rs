//! Song store actor
//!
//! Owns the [`SongLibrary`] and serializes every list/save/delete. Each
//! mutation is written to disk before it is acknowledged, then the new
//! collection is broadcast to every session as `songs-list`.

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace};

use super::library::{SongDraft, SongLibrary, SongRecord};
use crate::hub::{EventHub, ServerEvent};

/// Commands sent to the song store actor
#[derive(Debug)]
pub enum SongCommand {
    /// Current sorted collection
    List(oneshot::Sender<Vec<SongRecord>>),
    /// Insert or update; replies with the song id once persisted
    Save {
        draft: SongDraft,
        response: oneshot::Sender<String>,
    },
    /// Remove by id (no-op if absent); replies once persisted
    Delete {
        id: String,
        response: oneshot::Sender<()>,
    },
    /// Shut down the actor
    Shutdown,
}

/// Actor that owns the song library
pub struct SongStoreActor {
    library: SongLibrary,
    hub: EventHub,
    command_rx: mpsc::Receiver<SongCommand>,
    /// Total number of file writes performed
    write_count: u64,
}

/// Handle to communicate with the song store actor
///
/// This handle is cheap to clone and can be shared across tasks.
#[derive(Clone)]
pub struct SongStoreHandle {
    cmd_tx: mpsc::Sender<SongCommand>,
}

impl SongStoreActor {
    /// Spawn the actor around an already loaded library
    pub fn spawn(library: SongLibrary, hub: EventHub) -> SongStoreHandle {
        let (cmd_tx, command_rx) = mpsc::channel(100);

        let actor = SongStoreActor {
            library,
            hub,
            command_rx,
            write_count: 0,
        };

        tokio::spawn(actor.run());

        SongStoreHandle { cmd_tx }
    }

    async fn run(mut self) {
        info!(
            "Song store started ({} songs, file: {})",
            self.library.len(),
            self.library.path().display()
        );

        while let Some(cmd) = self.command_rx.recv().await {
            trace!(?cmd, "Song store command");

            match cmd {
                SongCommand::List(response_tx) => {
                    let _ = response_tx.send(self.library.songs().to_vec());
                }
                SongCommand::Save { draft, response } => {
                    let id = self.library.upsert(draft);
                    self.persist_and_broadcast().await;
                    let _ = response.send(id);
                }
                SongCommand::Delete { id, response } => {
                    self.library.remove(&id);
                    self.persist_and_broadcast().await;
                    let _ = response.send(());
                }
                SongCommand::Shutdown => {
                    info!(
                        "Song store shutdown complete (total writes: {})",
                        self.write_count
                    );
                    return;
                }
            }
        }
    }

    /// Write the file, then tell every session.
    ///
    /// A failed write keeps the in-memory collection; the disk copy stays
    /// stale until the next successful write.
    async fn persist_and_broadcast(&mut self) {
        match self.library.persist().await {
            Ok(()) => {
                self.write_count += 1;
            }
            Err(e) => {
                error!("Error saving songs: {:#}", anyhow::Error::from(e));
            }
        }

        let delivered = self
            .hub
            .publish(ServerEvent::SongsList(self.library.songs().to_vec()));
        debug!(
            songs = self.library.len(),
            sessions = delivered,
            "Song library broadcast"
        );
    }
}

impl SongStoreHandle {
    /// Current sorted collection
    pub async fn list(&self) -> Result<Vec<SongRecord>> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(SongCommand::List(tx))
            .await
            .context("Failed to send list command: song store shut down")?;

        rx.await.context("Failed to receive song list")
    }

    /// Save a song and return its id once it has been written
    pub async fn save(&self, draft: SongDraft) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(SongCommand::Save { draft, response: tx })
            .await
            .context("Failed to send save command: song store shut down")?;

        rx.await.context("Failed to receive save response")
    }

    /// Delete a song by id; unknown ids are accepted
    pub async fn delete(&self, id: impl Into<String>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(SongCommand::Delete {
                id: id.into(),
                response: tx,
            })
            .await
            .context("Failed to send delete command: song store shut down")?;

        rx.await.context("Failed to receive delete response")
    }

    /// Signal the actor to shut down
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.try_send(SongCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    async fn spawn_store(path: &std::path::Path) -> (SongStoreHandle, EventHub) {
        let hub = EventHub::default();
        let library = SongLibrary::load(path).await;
        (SongStoreActor::spawn(library, hub.clone()), hub)
    }

    fn read_titles(path: &std::path::Path) -> Vec<String> {
        let json = std::fs::read_to_string(path).unwrap();
        let songs: Vec<SongRecord> = serde_json::from_str(&json).unwrap();
        songs.into_iter().map(|s| s.title).collect()
    }

    #[tokio::test]
    async fn test_save_persists_before_ack() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("songs.json");
        let (store, _hub) = spawn_store(&path).await;

        store.save(SongDraft::titled("Amazing Grace")).await.unwrap();

        assert_eq!(read_titles(&path), vec!["Amazing Grace"]);
        store.shutdown();
    }

    #[tokio::test]
    async fn test_save_broadcasts_songs_list() {
        let temp = tempdir().unwrap();
        let (store, hub) = spawn_store(&temp.path().join("songs.json")).await;
        let mut rx = hub.subscribe();

        store.save(SongDraft::titled("Amazing Grace")).await.unwrap();

        match rx.recv().await.unwrap() {
            ServerEvent::SongsList(songs) => {
                assert_eq!(songs.len(), 1);
                assert_eq!(songs[0].title, "Amazing Grace");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        store.shutdown();
    }

    #[tokio::test]
    async fn test_edit_via_store() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("songs.json");
        let (store, _hub) = spawn_store(&path).await;

        let id = store.save(SongDraft::titled("Amazing Grace")).await.unwrap();
        store.save(SongDraft::titled("Be Still My Soul")).await.unwrap();

        let mut edit = SongDraft::titled("Amazing Grace (Edited)");
        edit.id = Some(id.clone());
        store.save(edit).await.unwrap();

        let songs = store.list().await.unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, id);
        assert_eq!(songs[0].title, "Amazing Grace (Edited)");
        assert_eq!(
            read_titles(&path),
            vec!["Amazing Grace (Edited)", "Be Still My Soul"]
        );
        store.shutdown();
    }

    #[tokio::test]
    async fn test_delete_unknown_still_writes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("songs.json");
        let (store, hub) = spawn_store(&path).await;
        store.save(SongDraft::titled("Amazing Grace")).await.unwrap();

        // Clobber the file so a rewrite is observable
        std::fs::write(&path, "[]").unwrap();
        let mut rx = hub.subscribe();

        store.delete("no-such-song").await.unwrap();

        assert_eq!(read_titles(&path), vec!["Amazing Grace"]);
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(matches!(rx.recv().await.unwrap(), ServerEvent::SongsList(_)));
        store.shutdown();
    }

    #[tokio::test]
    async fn test_delete_removes_song() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("songs.json");
        let (store, _hub) = spawn_store(&path).await;

        let id = store.save(SongDraft::titled("Amazing Grace")).await.unwrap();
        store.delete(id).await.unwrap();

        assert!(store.list().await.unwrap().is_empty());
        assert!(read_titles(&path).is_empty());
        store.shutdown();
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_copy() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("data");
        let path = dir.join("songs.json");
        let (store, _hub) = spawn_store(&path).await;

        // Replace the data directory so the next write fails
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "not a directory").unwrap();

        store.save(SongDraft::titled("Amazing Grace")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        store.shutdown();
    }

    #[tokio::test]
    async fn test_handle_errors_after_shutdown() {
        let temp = tempdir().unwrap();
        let (store, _hub) = spawn_store(&temp.path().join("songs.json")).await;

        store.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.list().await.is_err());
    }
}
