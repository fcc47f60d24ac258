//! Editor configuration consumed by the history and autosave subsystems.
//!
//! Loaded from TOML. Every field has a default, so a partial file (or no
//! file at all) is valid:
//!
//! ```toml
//! [autosave]
//! enabled = true
//! interval_seconds = 300
//! max_retained = 8
//! directory = "Submarines/.AutoSaves"
//!
//! [history]
//! undo_capacity = 32
//! ```

use crate::autosave::DEFAULT_MAX_RETAINED;
use crate::error::{EditorError, Result};
use crate::history::{DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave: AutoSaveConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub max_retained: usize,
    /// Hidden directory next to the regular saves.
    pub directory: PathBuf,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 300,
            max_retained: DEFAULT_MAX_RETAINED,
            directory: PathBuf::from("Submarines").join(".AutoSaves"),
        }
    }
}

impl AutoSaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub undo_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// Parse and normalize a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(contents)?;
        Ok(config.normalized())
    }

    /// Read and normalize a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            EditorError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
            .map_err(|e| EditorError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Like [`EditorConfig::load`], but falls back to defaults when the file
    /// is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("editor config load failed, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Write the config as TOML, replacing the file atomically.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let contents = toml::to_string_pretty(self)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(contents.as_bytes())?;
        temp.persist(path).map_err(|e| EditorError::Io(e.error))?;
        Ok(())
    }

    /// Clamp values into the ranges the engine supports.
    pub fn normalized(mut self) -> Self {
        self.history.undo_capacity = self.history.undo_capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        self.autosave.max_retained = self.autosave.max_retained.max(1);
        self.autosave.interval_seconds = self.autosave.interval_seconds.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.interval_seconds, 300);
        assert_eq!(config.autosave.max_retained, 8);
        assert_eq!(config.history.undo_capacity, 32);
    }

    #[test]
    fn test_partial_toml() {
        let config = EditorConfig::from_toml_str(
            r#"
            [autosave]
            interval_seconds = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.autosave.interval(), Duration::from_secs(60));
        assert_eq!(config.autosave.max_retained, 8);
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn test_values_are_clamped() {
        let config = EditorConfig::from_toml_str(
            r#"
            [autosave]
            interval_seconds = 0
            max_retained = 0

            [history]
            undo_capacity = 999999
            "#,
        )
        .unwrap();

        assert_eq!(config.autosave.interval_seconds, 1);
        assert_eq!(config.autosave.max_retained, 1);
        assert_eq!(config.history.undo_capacity, MAX_CAPACITY);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = EditorConfig::from_toml_str("autosave = [");
        assert!(matches!(result, Err(EditorError::Config(_))));
    }

    #[test]
    fn test_load_or_default_on_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.toml");
        fs::write(&path, "[history]\nundo_capacity = \"lots\"").unwrap();

        assert_eq!(EditorConfig::load_or_default(&path), EditorConfig::default());
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("editor.toml");

        let mut config = EditorConfig::default();
        config.autosave.enabled = false;
        config.history.undo_capacity = 128;
        config.write(&path).unwrap();

        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }
}
