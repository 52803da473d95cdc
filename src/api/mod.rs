//! HTTP API, WebSocket endpoint and static pages
//!
//! Scripture lookups are plain JSON GETs; presentation control happens over
//! the `/ws` WebSocket. Everything else is served from the public directory.

mod protocol;
mod session;


use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::scripture::{ScriptureError, ScriptureService, VerseText};
use crate::songs::SongStoreHandle;
use crate::state::{PresentationState, StateActorHandle};

pub use protocol::{ClientMessage, Request};

/// Shared state for API handlers
pub struct AppState {
    /// Presentation state actor
    pub presentation: StateActorHandle,
    /// Song library actor
    pub songs: SongStoreHandle,
    /// Local + remote scripture lookups
    pub scripture: ScriptureService,
}

/// API error response: `{"error": "..."}` with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: &self.error })).into_response()
    }
}

impl From<ScriptureError> for ApiError {
    fn from(err: ScriptureError) -> Self {
        if err.is_not_found() {
            warn!("Scripture lookup: {}", err);
            ApiError::new(StatusCode::NOT_FOUND, err.to_string())
        } else {
            error!("Scripture lookup failed: {}", error_chain(&err));
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Render the error chain for logging without consuming the error
fn error_chain(err: &ScriptureError) -> String {
    use std::error::Error;
    match err.source() {
        Some(source) => format!("{}: {}", err, source),
        None => err.to_string(),
    }
}

/// Response for GET /api/bible/chapters/:book
#[derive(Debug, Serialize)]
pub struct ChapterCount {
    pub book: String,
    pub chapters: u32,
}

/// Response for GET /api/bible/verse/...
#[derive(Debug, Serialize)]
pub struct VerseResponse {
    pub book: String,
    pub chapter: String,
    pub verse: String,
    pub text: String,
}

/// Response for GET /api/bible/verses/...
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRangeResponse {
    pub book: String,
    pub chapter: String,
    pub verse_start: String,
    pub verse_end: String,
    pub text: String,
}

/// Response for GET /api/bible/chapter/...
#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub book: String,
    pub chapter: String,
    pub verses: Vec<VerseText>,
}

/// Build the API router; unmatched paths fall back to files in `public_dir`
pub fn build_router(state: Arc<AppState>, public_dir: &Path) -> Router {
    Router::new()
        .route("/api/bible/books", get(list_books))
        .route("/api/bible/chapters/:book", get(chapter_count))
        .route("/api/bible/verse/:book/:chapter/:verse", get(get_verse))
        .route(
            "/api/bible/verses/:book/:chapter/:verse_start/:verse_end",
            get(get_verse_range),
        )
        .route("/api/bible/chapter/:book/:chapter", get(get_chapter))
        .route("/api/state", get(current_state))
        .route("/api/health", get(health_check))
        .route("/ws", get(session::upgrade))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /api/bible/books - Book names in canonical order
async fn list_books(State(state): State<Arc<AppState>>) -> Json<Vec<&'static str>> {
    Json(state.scripture.books())
}

/// GET /api/bible/chapters/:book - Chapter count (1 for unknown books)
async fn chapter_count(
    UrlPath(book): UrlPath<String>,
    State(state): State<Arc<AppState>>,
) -> Json<ChapterCount> {
    let chapters = state.scripture.chapter_count(&book);
    Json(ChapterCount { book, chapters })
}

/// GET /api/bible/verse/:book/:chapter/:verse - Single verse
async fn get_verse(
    UrlPath((book, chapter, verse)): UrlPath<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VerseResponse>, ApiError> {
    let text = state.scripture.verse(&book, &chapter, &verse).await?;
    Ok(Json(VerseResponse {
        book,
        chapter,
        verse,
        text,
    }))
}

/// GET /api/bible/verses/:book/:chapter/:verse_start/:verse_end - Verse range
async fn get_verse_range(
    UrlPath((book, chapter, verse_start, verse_end)): UrlPath<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VerseRangeResponse>, ApiError> {
    let (Ok(start), Ok(end)) = (verse_start.parse::<u32>(), verse_end.parse::<u32>()) else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Invalid verse range"));
    };

    let text = state
        .scripture
        .verse_range(&book, &chapter, start, end)
        .await?;

    Ok(Json(VerseRangeResponse {
        book,
        chapter,
        verse_start,
        verse_end,
        text,
    }))
}

/// GET /api/bible/chapter/:book/:chapter - Whole chapter
async fn get_chapter(
    UrlPath((book, chapter)): UrlPath<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChapterResponse>, ApiError> {
    let verses = state.scripture.chapter(&book, &chapter).await?;
    Ok(Json(ChapterResponse {
        book,
        chapter,
        verses,
    }))
}

/// GET /api/state - Current presentation state
async fn current_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PresentationState>, ApiError> {
    state
        .presentation
        .snapshot()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "State unavailable"))
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    public_dir: &Path,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let router = build_router(state, public_dir);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server error")?;

    Ok(())
}

/// Bind `0.0.0.0:port` and serve until `shutdown` resolves
pub async fn start_server(
    state: Arc<AppState>,
    port: u16,
    public_dir: &Path,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://localhost:{}", port);
    info!("Display page: http://localhost:{}/display.html", port);
    info!("Control page: http://localhost:{}/control.html", port);

    serve(listener, state, public_dir, shutdown).await
}
