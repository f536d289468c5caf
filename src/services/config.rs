//! User configuration (`~/.homescore/config.json`)
//!
//! Every field is optional in the file; missing fields take their defaults.
//! Command-line flags are applied on top by the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::{HomescoreError, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.jinka.fr";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomescoreConfig {
    /// Listing source: a JSON file, a directory of JSON files, or an http(s) URL
    pub source: Option<String>,
    /// File modification polling interval
    pub watch_interval_ms: u64,
    /// Quiet period after a change before an update event is sent
    pub debounce_ms: u64,
    /// Refresh period for remote sources
    pub remote_refresh_secs: u64,
    pub request_timeout_secs: u64,
    /// Base URL for relative listing links
    pub base_url: String,
}

impl Default for HomescoreConfig {
    fn default() -> Self {
        Self {
            source: None,
            watch_interval_ms: 1000,
            debounce_ms: 1000,
            remote_refresh_secs: 30,
            request_timeout_secs: 10,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl HomescoreConfig {
    /// `~/.homescore/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| HomescoreError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".homescore").join("config.json"))
    }

    /// Load from the default location; a missing file yields the defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| HomescoreError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Intervals must be non-zero and the base URL must be http(s)
    pub fn validate(&self) -> Result<()> {
        if self.watch_interval_ms == 0 {
            return Err(HomescoreError::Config("watch_interval_ms must be > 0".into()));
        }
        if self.remote_refresh_secs == 0 {
            return Err(HomescoreError::Config("remote_refresh_secs must be > 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(HomescoreError::Config("request_timeout_secs must be > 0".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(HomescoreError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn remote_refresh(&self) -> Duration {
        Duration::from_secs(self.remote_refresh_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HomescoreConfig::default();
        assert_eq!(config.source, None);
        assert_eq!(config.watch_interval(), Duration::from_secs(1));
        assert_eq!(config.debounce(), Duration::from_secs(1));
        assert_eq!(config.remote_refresh(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.base_url, "https://www.jinka.fr");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = HomescoreConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, HomescoreConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"source": "data/scores.json", "debounce_ms": 250}"#).unwrap();

        let config = HomescoreConfig::load_from(&path).unwrap();
        assert_eq!(config.source.as_deref(), Some("data/scores.json"));
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.watch_interval_ms, 1000);
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{source:").unwrap();

        let err = HomescoreConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, HomescoreError::Config(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"watch_interval_ms": 0}"#).unwrap();

        let err = HomescoreConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("watch_interval_ms"));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let config = HomescoreConfig {
            base_url: "www.jinka.fr".into(),
            ..HomescoreConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
