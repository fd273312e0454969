//! Persistent configuration for codecept-export.
//!
//! Stores user settings in `~/.codecept-export/config.json`. Every field is
//! optional; command-line flags take precedence over what is stored here.
//!
//! # Example
//!
//! ```no_run
//! use codecept_export_core::config::ExportConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = ExportConfig::load();
//! println!("health check every {:?}", config.health_interval());
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ipc::codecept_dir;

const CONFIG_FILENAME: &str = "config.json";

/// How often the server checks that the recorder still knows about it.
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Base URL used when neither the request nor the project names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_base_url: Option<String>,

    /// Socket of the recorder host the server registers with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_socket: Option<PathBuf>,

    /// Interval between health checks, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_interval_ms: Option<u64>,
}

impl ExportConfig {
    /// Path of the config file.
    pub fn path() -> PathBuf {
        codecept_dir().join(CONFIG_FILENAME)
    }

    /// Load config from `~/.codecept-export/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.codecept-export/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(
            self.health_interval_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_HEALTH_INTERVAL_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExportConfig::default();
        assert!(config.default_base_url.is_none());
        assert_eq!(config.health_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let config = ExportConfig {
            health_interval_ms: Some(0),
            ..ExportConfig::default()
        };
        assert_eq!(config.health_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ExportConfig {
            default_base_url: Some("https://staging.test".into()),
            host_socket: Some(PathBuf::from("/tmp/host.sock")),
            health_interval_ms: Some(250),
        };
        config.save_to(&path).unwrap();
        assert_eq!(ExportConfig::load_from(&path), config);
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(ExportConfig::load_from(&path), ExportConfig::default());
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(ExportConfig::load_from(&path), ExportConfig::default());
    }

    #[test]
    fn deserialize_empty_json() {
        let loaded: ExportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded, ExportConfig::default());
    }
}
