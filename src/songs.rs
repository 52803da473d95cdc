//! Song library - persisted list of songs the control pages can project
//!
//! [`SongLibrary`] holds the sorted collection and its file; the
//! [`SongStoreActor`] serializes access to it and broadcasts changes.

mod actor;
mod library;

pub use actor::{SongCommand, SongStoreActor, SongStoreHandle};
pub use library::{SongDraft, SongLibrary, SongRecord, SongStoreError};
