//! Client configuration.
//!
//! Settings are layered: built-in defaults, then
//! `<config_dir>/entity-browser/config.json`, then environment variables:
//! - `ENTITY_BROWSER_URL` - Base URL of the backend (default: `http://localhost:8080`)
//! - `ENTITY_BROWSER_API_KEY` - Bearer token (optional)
//! - `ENTITY_BROWSER_TIMEOUT_MS` - Per-request timeout in milliseconds

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "entity-browser";
const CONFIG_FILE: &str = "config.json";

/// Default backend URL for local development.
pub const DEFAULT_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: Option<String>,
    /// Requests taking longer than this fail instead of hanging.
    pub request_timeout_ms: u64,
    /// Fade-in applied to freshly rendered search results.
    pub fade_in_ms: u64,
    /// Fade-in applied to the legacy status area.
    pub status_fade_in_ms: u64,
    /// Drop search responses that arrive after a newer search was issued.
    pub discard_stale_responses: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            api_key: None,
            request_timeout_ms: 30_000,
            fade_in_ms: 300,
            status_fade_in_ms: 1500,
            discard_stale_responses: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the user's config directory and the environment.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::from_path(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the configuration to the user's config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = get_config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("ENTITY_BROWSER_URL") {
            self.base_url = url;
        }
        if let Some(key) = lookup("ENTITY_BROWSER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(raw) = lookup("ENTITY_BROWSER_TIMEOUT_MS") {
            match raw.parse() {
                Ok(ms) => self.request_timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid ENTITY_BROWSER_TIMEOUT_MS={:?}", raw),
            }
        }
        self
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn status_fade_in(&self) -> Duration {
        Duration::from_millis(self.status_fade_in_ms)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
