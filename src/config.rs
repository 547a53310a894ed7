//! Engine configuration
//!
//! Every field has a default, so a config file only needs the keys it changes.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default limit for files opened by `show`: 2000 MiB
pub const DEFAULT_MAX_VIEW_SIZE: u64 = 2000 * 1024 * 1024;

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub level: String,
    /// Log file; stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for `random`; OS entropy when unset
    pub seed: Option<u64>,
    pub save_slot: String,
    /// Folder next to the script that `show` reads from
    pub archive_dir: String,
    pub plugins_dir: PathBuf,
    /// Folder scanned for script folders by the menu
    pub novel_dir: PathBuf,
    pub debug_console: bool,
    pub max_view_size: u64,
    pub log: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            save_slot: "autosave".to_string(),
            archive_dir: "archive".to_string(),
            plugins_dir: PathBuf::from("Plugins"),
            novel_dir: PathBuf::from("Novel"),
            debug_console: false,
            max_view_size: DEFAULT_MAX_VIEW_SIZE,
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| EngineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a config file if it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_save_slot(mut self, slot: impl Into<String>) -> Self {
        self.save_slot = slot.into();
        self
    }

    pub fn with_debug_console(mut self, enabled: bool) -> Self {
        self.debug_console = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pgn.json");
        std::fs::write(&path, r#"{ "seed": 7, "log": { "level": "debug" } }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.save_slot, "autosave");
        assert_eq!(config.log.level, "debug");
        assert!(config.log.enabled);
        assert_eq!(config.max_view_size, DEFAULT_MAX_VIEW_SIZE);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pgn.json");
        std::fs::write(&path, "{ seed: ").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::load_or_default(dir.path().join("none.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn builders() {
        let config = EngineConfig::default()
            .with_seed(3)
            .with_save_slot("slot2")
            .with_debug_console(true);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.save_slot, "slot2");
        assert!(config.debug_console);
    }
}
