//! WebSocket sessions - one task per connected control or display client
//!
//! A session first receives the full current state, then relays its
//! client's messages to the actors while forwarding every hub event back
//! out. Sessions are independent: a slow or dead socket only affects itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::protocol::{ClientMessage, Request};
use super::AppState;
use crate::hub::ServerEvent;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// GET /ws - upgrade to a real-time session
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<()> {
    let json = serde_json::to_string(event).context("Failed to serialize event")?;
    socket
        .send(Message::Text(json))
        .await
        .context("Failed to send event")
}

async fn run_session(mut socket: WebSocket, state: Arc<AppState>) {
    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    info!(session = id, "Client connected");

    let Some(joined) = state.presentation.join().await else {
        warn!(session = id, "State actor unavailable, closing session");
        return;
    };
    let mut events = joined.events;

    if let Err(e) = send_event(&mut socket, &ServerEvent::StateUpdate(joined.snapshot)).await {
        debug!(session = id, "Initial state not delivered: {:#}", e);
        return;
    }

    loop {
        tokio::select! {
            // Forward hub events to this client
            result = events.recv() => {
                match result {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            debug!(session = id, "WebSocket client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(session = id, "Event hub closed");
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // The next event is a full snapshot, nothing to replay
                        warn!(session = id, "WebSocket client lagged by {} messages", n);
                    }
                }
            }
            // Handle messages from this client
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_text(&state, &mut socket, id, &text).await {
                            debug!(session = id, "Session ended while replying: {:#}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(session = id, "WebSocket client closed connection");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us
                    }
                    Some(Err(e)) => {
                        warn!(session = id, "WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!(session = id, "Client disconnected");
}

/// Route one client frame.
///
/// Malformed frames and store failures are logged and dropped; only a failed
/// write to this socket is returned as an error.
async fn handle_text(
    state: &AppState,
    socket: &mut WebSocket,
    session: u64,
    text: &str,
) -> Result<()> {
    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(session, "Ignoring malformed message: {}", e);
            return Ok(());
        }
    };

    match message.into_request() {
        Request::Present(mutation) => {
            debug!(session, kind = mutation.kind(), "Mutation received");
            state.presentation.apply(mutation);
        }
        Request::ListSongs => match state.songs.list().await {
            Ok(songs) => send_event(socket, &ServerEvent::SongsList(songs)).await?,
            Err(e) => warn!(session, "Failed to list songs: {:#}", e),
        },
        Request::SaveSong(draft) => match state.songs.save(draft).await {
            Ok(song_id) => info!(session, %song_id, "Song saved"),
            Err(e) => warn!(session, "Failed to save song: {:#}", e),
        },
        Request::DeleteSong(song_id) => match state.songs.delete(song_id.clone()).await {
            Ok(()) => info!(session, %song_id, "Song deleted"),
            Err(e) => warn!(session, "Failed to delete song: {:#}", e),
        },
    }

    Ok(())
}
