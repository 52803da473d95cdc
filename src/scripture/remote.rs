//! Remote scripture API client (bible-api.com compatible)
//!
//! One GET per lookup, reference encoded in the URL path:
//! `{base}/John%203:16?translation=kjv`. No retries, no caching and no
//! request timeout beyond the client defaults.

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::ScriptureError;

/// Default remote API base URL
pub const DEFAULT_API_URL: &str = "https://bible-api.com/";

/// Default translation requested from the remote API
pub const DEFAULT_TRANSLATION: &str = "kjv";

/// Response body of the remote API (only the fields we read)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiPassage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub verses: Option<Vec<ApiVerse>>,
}

/// One verse entry in a remote chapter response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiVerse {
    pub verse: u32,
    pub text: String,
}

/// HTTP client for the remote scripture API
#[derive(Debug, Clone)]
pub struct BibleApi {
    client: reqwest::Client,
    base_url: Url,
    translation: String,
}

impl BibleApi {
    /// Create a client for `base_url` requesting `translation`
    pub fn new(base_url: &str, translation: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid scripture API URL: {}", base_url))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            bail!("Scripture API URL must be an http(s) base URL: {}", base_url);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            translation: translation.into(),
        })
    }

    /// Full request URL for a reference such as `"1 John 4:8"`
    pub fn passage_url(&self, reference: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(reference);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("translation", &self.translation);
        url
    }

    /// Fetch and decode one passage
    pub async fn fetch(&self, reference: &str) -> Result<ApiPassage, ScriptureError> {
        let url = self.passage_url(reference);
        debug!(%url, "Fetching passage from remote API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ScriptureError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(ScriptureError::Request)?;
        let passage: ApiPassage = serde_json::from_slice(&body).map_err(ScriptureError::Parse)?;

        debug!(%status, reference, "Remote API responded");
        Ok(passage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_url_encodes_reference() {
        let api = BibleApi::new(DEFAULT_API_URL, "kjv").unwrap();
        let url = api.passage_url("1 John 4:8");
        assert_eq!(
            url.as_str(),
            "https://bible-api.com/1%20John%204:8?translation=kjv"
        );
    }

    #[test]
    fn test_passage_url_without_trailing_slash() {
        let api = BibleApi::new("http://localhost:8080/api", "web").unwrap();
        let url = api.passage_url("John 3:16-17");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/John%203:16-17?translation=web"
        );
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(BibleApi::new("mailto:someone@example.com", "kjv").is_err());
        assert!(BibleApi::new("ftp://example.com/", "kjv").is_err());
        assert!(BibleApi::new("not a url", "kjv").is_err());
    }

    #[test]
    fn test_passage_without_text() {
        let passage: ApiPassage = serde_json::from_str(r#"{"error": "not found"}"#).unwrap();
        assert!(passage.text.is_none());
        assert!(passage.verses.is_none());
    }
}
