//! Scripture lookup - local dataset first, remote API as fallback
//!
//! A full address found in the local dataset is answered without touching
//! the network. Anything else is one request to the remote API, whose
//! response is normalized to the same shapes.

pub mod canon;
mod local;
mod remote;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use local::LocalBible;
pub use remote::{ApiPassage, ApiVerse, BibleApi, DEFAULT_API_URL, DEFAULT_TRANSLATION};

/// Lookup failures, as surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ScriptureError {
    /// The address does not exist locally or remotely (`"Verse"`, `"Chapter"`...)
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Transport failure talking to the remote API
    #[error("API request failed")]
    Request(#[source] reqwest::Error),
    /// The remote API answered with something that is not the expected JSON
    #[error("Failed to parse response")]
    Parse(#[source] serde_json::Error),
}

impl ScriptureError {
    /// Whether this is a not-found outcome rather than an upstream failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScriptureError::NotFound(_))
    }
}

/// One numbered verse of a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseText {
    pub verse: u32,
    pub text: String,
}

/// Scripture lookups shared by all HTTP handlers
///
/// Read-only after construction, so lookups run concurrently.
#[derive(Debug, Clone)]
pub struct ScriptureService {
    local: Option<LocalBible>,
    remote: BibleApi,
}

impl ScriptureService {
    pub fn new(local: Option<LocalBible>, remote: BibleApi) -> Self {
        Self { local, remote }
    }

    /// Whether a local dataset is loaded
    pub fn has_local_data(&self) -> bool {
        self.local.is_some()
    }

    /// Book names in canonical order
    pub fn books(&self) -> Vec<&'static str> {
        canon::books().collect()
    }

    /// Chapter count for a book (1 for unknown books)
    pub fn chapter_count(&self, book: &str) -> u32 {
        canon::chapter_count(book)
    }

    /// Text of a single verse
    pub async fn verse(
        &self,
        book: &str,
        chapter: &str,
        verse: &str,
    ) -> Result<String, ScriptureError> {
        if let Some(text) = self
            .local
            .as_ref()
            .and_then(|bible| bible.verse(book, chapter, verse))
        {
            debug!(book, chapter, verse, "Verse served from local dataset");
            return Ok(text.to_string());
        }

        let reference = format!("{} {}:{}", book, chapter, verse);
        let passage = self.remote.fetch(&reference).await?;
        passage_text(passage, "Verse")
    }

    /// Text of verses `start..=end`
    pub async fn verse_range(
        &self,
        book: &str,
        chapter: &str,
        start: u32,
        end: u32,
    ) -> Result<String, ScriptureError> {
        if let Some(text) = self
            .local
            .as_ref()
            .and_then(|bible| bible.verse_range(book, chapter, start, end))
        {
            debug!(book, chapter, start, end, "Verses served from local dataset");
            return Ok(text);
        }

        let reference = format!("{} {}:{}-{}", book, chapter, start, end);
        let passage = self.remote.fetch(&reference).await?;
        passage_text(passage, "Verses")
    }

    /// Every verse of a chapter, in order
    pub async fn chapter(&self, book: &str, chapter: &str) -> Result<Vec<VerseText>, ScriptureError> {
        if let Some(verses) = self
            .local
            .as_ref()
            .and_then(|bible| bible.full_chapter(book, chapter))
        {
            debug!(book, chapter, "Chapter served from local dataset");
            return Ok(verses);
        }

        let reference = format!("{} {}", book, chapter);
        let passage = self.remote.fetch(&reference).await?;
        let verses = passage.verses.ok_or(ScriptureError::NotFound("Chapter"))?;

        Ok(verses
            .into_iter()
            .map(|v| VerseText {
                verse: v.verse,
                text: v.text.trim().to_string(),
            })
            .collect())
    }
}

fn passage_text(passage: ApiPassage, what: &'static str) -> Result<String, ScriptureError> {
    passage
        .text
        .filter(|text| !text.is_empty())
        .map(|text| text.trim().to_string())
        .ok_or(ScriptureError::NotFound(what))
}
