//! Stage Relay - live presentation control server
//!
//! A control page drives what a display page shows (scripture, song lyrics,
//! the event program). Both connect over WebSocket and share one
//! authoritative presentation state.

pub mod api;
pub mod config;
pub mod hub;
pub mod scripture;
pub mod songs;
pub mod state;
