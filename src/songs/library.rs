//! Song library backed by a flat JSON file
//!
//! The whole collection lives in memory, sorted by title, and is rewritten
//! to disk wholesale after every mutation.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// A stored song
///
/// Only `id` and `title` mean anything to the server; every other field the
/// control page sends (lyrics, author, key...) is kept as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A song as submitted by a client; `id` is absent for new songs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SongDraft {
    /// Draft with a title and nothing else
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            extra: Map::new(),
        }
    }
}

/// Errors writing the song file
#[derive(Debug, Error)]
pub enum SongStoreError {
    #[error("failed to serialize song library")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write song library to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Title ordering: case-insensitive first, original text as tie-breaker
fn title_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// In-memory song collection bound to its file
#[derive(Debug)]
pub struct SongLibrary {
    path: PathBuf,
    songs: Vec<SongRecord>,
}

impl SongLibrary {
    /// Load the library from `path`.
    ///
    /// A missing file is created empty. An unreadable or unparsable file is
    /// logged and the library starts empty; this never fails.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let songs = match fs::read_to_string(&path).await {
            Ok(json) => match serde_json::from_str::<Vec<SongRecord>>(&json) {
                Ok(songs) => {
                    info!("Loaded {} songs from library", songs.len());
                    songs
                }
                Err(e) => {
                    error!("Error loading songs from {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No song library at {}, creating it", path.display());
                if let Err(e) = create_empty(&path).await {
                    error!("Error creating song library: {:#}", e);
                }
                Vec::new()
            }
            Err(e) => {
                error!("Error loading songs from {}: {}", path.display(), e);
                Vec::new()
            }
        };

        let mut library = Self { path, songs };
        library.sort();
        library
    }

    /// Sorted view of the collection
    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    /// File backing this library
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Insert or replace a song and return its id.
    ///
    /// A draft whose id matches an existing song replaces it in place. A
    /// draft without an id gets a fresh time-based one. Does not persist.
    pub fn upsert(&mut self, draft: SongDraft) -> String {
        let SongDraft { id, title, extra } = draft;
        let id = id.filter(|id| !id.is_empty());

        let id = match id {
            Some(id) => {
                if let Some(existing) = self.songs.iter_mut().find(|s| s.id == id) {
                    existing.title = title;
                    existing.extra = extra;
                    debug!(id = %existing.id, "Song updated");
                    self.sort();
                    return id;
                }
                id
            }
            None => self.fresh_id(),
        };

        debug!(%id, "Song added");
        self.songs.push(SongRecord {
            id: id.clone(),
            title,
            extra,
        });
        self.sort();
        id
    }

    /// Remove a song; returns whether anything was removed. Does not persist.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.songs.len();
        self.songs.retain(|s| s.id != id);
        let removed = self.songs.len() != before;
        if !removed {
            debug!(id, "Delete requested for unknown song");
        }
        removed
    }

    /// Rewrite the whole file with the current collection
    pub async fn persist(&self) -> Result<(), SongStoreError> {
        let json = serde_json::to_string_pretty(&self.songs)?;
        fs::write(&self.path, json)
            .await
            .map_err(|source| SongStoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = self.songs.len(), "Song library written");
        Ok(())
    }

    fn sort(&mut self) {
        self.songs.sort_by(|a, b| title_order(&a.title, &b.title));
    }

    /// Milliseconds since epoch, bumped past any id already taken
    fn fresh_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        loop {
            let id = candidate.to_string();
            if !self.songs.iter().any(|s| s.id == id) {
                return id;
            }
            warn!(%id, "Song id collision, bumping");
            candidate += 1;
        }
    }
}

async fn create_empty(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    fs::write(path, "[]")
        .await
        .with_context(|| format!("Failed to write empty song library: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn titles(library: &SongLibrary) -> Vec<&str> {
        library.songs().iter().map(|s| s.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_missing_file_is_created_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data").join("songs.json");

        let library = SongLibrary::load(&path).await;

        assert!(library.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("songs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let library = SongLibrary::load(&path).await;
        assert!(library.is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_length_and_reorders() {
        let temp = tempdir().unwrap();
        let mut library = SongLibrary::load(temp.path().join("songs.json")).await;

        let id = library.upsert(SongDraft::titled("Amazing Grace"));
        library.upsert(SongDraft::titled("Be Thou My Vision"));
        library.upsert(SongDraft::titled("Abide With Me"));
        assert_eq!(
            titles(&library),
            vec!["Abide With Me", "Amazing Grace", "Be Thou My Vision"]
        );

        let mut edit = SongDraft::titled("Zion's Hill");
        edit.id = Some(id.clone());
        let edited_id = library.upsert(edit);

        assert_eq!(edited_id, id);
        assert_eq!(library.len(), 3);
        assert_eq!(
            titles(&library),
            vec!["Abide With Me", "Be Thou My Vision", "Zion's Hill"]
        );
        assert_eq!(library.songs()[2].id, id);
    }

    #[tokio::test]
    async fn test_edit_title_in_place() {
        let temp = tempdir().unwrap();
        let mut library = SongLibrary::load(temp.path().join("songs.json")).await;

        let id = library.upsert(SongDraft::titled("Amazing Grace"));
        let mut edit = SongDraft::titled("Amazing Grace (Edited)");
        edit.id = Some(id.clone());
        library.upsert(edit);

        assert_eq!(library.len(), 1);
        assert_eq!(library.songs()[0].title, "Amazing Grace (Edited)");
        assert_eq!(library.songs()[0].id, id);
    }

    #[tokio::test]
    async fn test_ordering_ignores_case() {
        let temp = tempdir().unwrap();
        let mut library = SongLibrary::load(temp.path().join("songs.json")).await;

        library.upsert(SongDraft::titled("great is Thy faithfulness"));
        library.upsert(SongDraft::titled("Amazing Grace"));
        library.upsert(SongDraft::titled("Blessed Assurance"));

        assert_eq!(
            titles(&library),
            vec![
                "Amazing Grace",
                "Blessed Assurance",
                "great is Thy faithfulness"
            ]
        );
    }

    #[tokio::test]
    async fn test_generated_ids_are_unique() {
        let temp = tempdir().unwrap();
        let mut library = SongLibrary::load(temp.path().join("songs.json")).await;

        let a = library.upsert(SongDraft::titled("One"));
        let b = library.upsert(SongDraft::titled("Two"));
        let c = library.upsert(SongDraft::titled("Three"));

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert!(a.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_supplied_id_is_kept() {
        let temp = tempdir().unwrap();
        let mut library = SongLibrary::load(temp.path().join("songs.json")).await;

        let mut draft = SongDraft::titled("Imported");
        draft.id = Some("legacy-42".to_string());
        assert_eq!(library.upsert(draft), "legacy-42");
        assert_eq!(library.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_noop() {
        let temp = tempdir().unwrap();
        let mut library = SongLibrary::load(temp.path().join("songs.json")).await;
        library.upsert(SongDraft::titled("Amazing Grace"));

        assert!(!library.remove("does-not-exist"));
        assert_eq!(library.len(), 1);
    }

    #[tokio::test]
    async fn test_extra_fields_survive_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("songs.json");

        let mut library = SongLibrary::load(&path).await;
        let draft: SongDraft = serde_json::from_value(json!({
            "title": "Amazing Grace",
            "author": "John Newton",
            "slides": ["Amazing grace, how sweet the sound", "That saved a wretch like me"]
        }))
        .unwrap();
        library.upsert(draft);
        library.persist().await.unwrap();

        let reloaded = SongLibrary::load(&path).await;
        assert_eq!(reloaded.len(), 1);
        let song = &reloaded.songs()[0];
        assert_eq!(song.extra["author"], "John Newton");
        assert_eq!(song.extra["slides"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_persist_failure_reports_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing-dir").join("songs.json");
        let library = SongLibrary {
            path: path.clone(),
            songs: Vec::new(),
        };

        let err = library.persist().await.unwrap_err();
        assert!(matches!(err, SongStoreError::Write { .. }));
        assert!(err.to_string().contains("songs.json"));
    }
}
