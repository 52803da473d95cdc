//! Client-to-server WebSocket messages
//!
//! Frames are JSON text: `{"event": "lyrics-navigate", "data": "next"}`.
//! Event names match the ones the control and display pages emit.

use serde::Deserialize;

use crate::songs::SongDraft;
use crate::state::{BibleSlide, Direction, DisplayPatch, Lyrics, Mode, Program, StateMutation, StatePatch};

/// Every message a client may send
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    UpdateState(StatePatch),
    UpdateBible(BibleSlide),
    UpdateLyrics(Lyrics),
    UpdateProgram(Program),
    LyricsNavigate(Direction),
    ProgramNavigate(Direction),
    UpdateDisplay(DisplayPatch),
    ChangeMode(Mode),
    ClearDisplay,
    GetSongs,
    SaveSong(SongDraft),
    DeleteSong(String),
}

/// Where a client message is routed
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Mutation for the presentation state actor
    Present(StateMutation),
    /// Reply with the song list to the sender only
    ListSongs,
    /// Save a song (broadcasts `songs-list`)
    SaveSong(SongDraft),
    /// Delete a song (broadcasts `songs-list`)
    DeleteSong(String),
}

impl ClientMessage {
    /// Parse a text frame
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn into_request(self) -> Request {
        match self {
            ClientMessage::UpdateState(patch) => Request::Present(StateMutation::Merge(patch)),
            ClientMessage::UpdateBible(bible) => Request::Present(StateMutation::SetBible(bible)),
            ClientMessage::UpdateLyrics(lyrics) => {
                Request::Present(StateMutation::SetLyrics(lyrics))
            }
            ClientMessage::UpdateProgram(program) => {
                Request::Present(StateMutation::SetProgram(program))
            }
            ClientMessage::LyricsNavigate(direction) => {
                Request::Present(StateMutation::NavigateLyrics(direction))
            }
            ClientMessage::ProgramNavigate(direction) => {
                Request::Present(StateMutation::NavigateProgram(direction))
            }
            ClientMessage::UpdateDisplay(patch) => {
                Request::Present(StateMutation::SetDisplay(patch))
            }
            ClientMessage::ChangeMode(mode) => Request::Present(StateMutation::SetMode(mode)),
            ClientMessage::ClearDisplay => Request::Present(StateMutation::Clear),
            ClientMessage::GetSongs => Request::ListSongs,
            ClientMessage::SaveSong(draft) => Request::SaveSong(draft),
            ClientMessage::DeleteSong(id) => Request::DeleteSong(id),
        }
    }
}
