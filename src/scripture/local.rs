//! Local scripture dataset
//!
//! JSON file shaped as `book -> chapter -> verse -> text`, with chapter and
//! verse numbers as string keys.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

use super::VerseText;

type Chapter = HashMap<String, String>;
type Book = HashMap<String, Chapter>;

/// In-memory copy of a full translation
#[derive(Debug, Default, Clone)]
pub struct LocalBible {
    books: HashMap<String, Book>,
}

impl LocalBible {
    /// Load a dataset file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read scripture dataset: {}", path.display()))?;

        Self::from_json(&json)
            .with_context(|| format!("Failed to parse scripture dataset: {}", path.display()))
    }

    /// Parse a dataset from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let books: HashMap<String, Book> = serde_json::from_str(json)?;
        Ok(Self { books })
    }

    /// Number of books in the dataset
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    fn chapter(&self, book: &str, chapter: &str) -> Option<&Chapter> {
        self.books.get(book)?.get(chapter)
    }

    /// Text of a single verse
    pub fn verse(&self, book: &str, chapter: &str, verse: &str) -> Option<&str> {
        self.chapter(book, chapter)?.get(verse).map(String::as_str)
    }

    /// Verses `start..=end` rendered as `"16. text 17. text"`.
    ///
    /// Missing verses inside the range are skipped; None when none exist.
    pub fn verse_range(&self, book: &str, chapter: &str, start: u32, end: u32) -> Option<String> {
        let verses = self.chapter(book, chapter)?;

        let mut present: Vec<(u32, &String)> = verses
            .iter()
            .filter_map(|(number, text)| number.parse::<u32>().ok().map(|v| (v, text)))
            .filter(|(v, _)| (start..=end).contains(v))
            .collect();
        present.sort_unstable_by_key(|(v, _)| *v);

        let parts: Vec<String> = present
            .into_iter()
            .map(|(v, text)| format!("{}. {}", v, text))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Every verse of a chapter in numeric order
    pub fn full_chapter(&self, book: &str, chapter: &str) -> Option<Vec<VerseText>> {
        let verses = self.chapter(book, chapter)?;

        let mut out: Vec<VerseText> = verses
            .iter()
            .filter_map(|(number, text)| {
                number.parse::<u32>().ok().map(|verse| VerseText {
                    verse,
                    text: text.clone(),
                })
            })
            .collect();
        out.sort_by_key(|v| v.verse);
        Some(out)
    }
}
