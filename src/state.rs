//! Presentation state module - the document every display renders
//!
//! One actor owns the state; sessions send it mutations and receive the full
//! updated document through the event hub after each one.

mod actor;
mod actor_handle;
mod commands;
mod types;

pub use actor::StateActor;
pub use actor_handle::StateActorHandle;
pub use commands::Joined;
pub use types::{
    BibleSlide, Direction, DisplayPatch, DisplaySettings, Lyrics, Mode, PresentationState,
    Program, StateMutation, StatePatch, Step, DEFAULT_FONT_SIZE, DEFAULT_THEME,
};
