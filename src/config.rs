//! Configuration management for Stage Relay
//!
//! Settings come from an optional YAML file; command-line flags and
//! environment variables (`PORT`) override it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::scripture::{BibleApi, DEFAULT_API_URL, DEFAULT_TRANSLATION};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Song library file name inside the data directory
pub const SONGS_FILE: &str = "songs.json";

/// Local scripture dataset file name inside the data directory
pub const BIBLE_FILE: &str = "kjv.json";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `songs.json` and the optional `kjv.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory served as static pages (control / display)
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    #[serde(default)]
    pub scripture: ScriptureConfig,
}

/// Remote scripture API settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScriptureConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_translation")]
    pub translation: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_dir: default_data_dir(),
            public_dir: default_public_dir(),
            scripture: ScriptureConfig::default(),
        }
    }
}

impl Default for ScriptureConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            translation: default_translation(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for correctness
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port cannot be 0");
        }
        if self.scripture.translation.trim().is_empty() {
            anyhow::bail!("scripture.translation cannot be empty");
        }
        BibleApi::new(&self.scripture.api_url, self.scripture.translation.clone())
            .context("Invalid scripture.api_url")?;

        Ok(())
    }

    /// Path of the song library file
    pub fn songs_path(&self) -> PathBuf {
        self.data_dir.join(SONGS_FILE)
    }

    /// Path of the optional local scripture dataset
    pub fn bible_path(&self) -> PathBuf {
        self.data_dir.join(BIBLE_FILE)
    }
}

// Default value functions
fn default_port() -> u16 { DEFAULT_PORT }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_public_dir() -> PathBuf { PathBuf::from("public") }
fn default_api_url() -> String { DEFAULT_API_URL.to_string() }
fn default_translation() -> String { DEFAULT_TRANSLATION.to_string() }
