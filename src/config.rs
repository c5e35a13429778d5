//! Session settings persisted between runs: last CSV and filter
//! selections. Best-effort only, a missing or corrupt file just means
//! defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub last_csv: Option<PathBuf>,
    /// Column name -> selected values. A column absent from the map means
    /// "everything selected".
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
}

impl AppConfig {
    /// Platform config file, e.g. `~/.config/habitboard/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("habitboard").join("config.json"))
    }

    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, path = %path.display(), "ignoring corrupt config");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Err(err) = self.save_to(&path) {
            warn!(%err, path = %path.display(), "failed to save config");
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig {
            last_csv: Some(PathBuf::from("/tmp/students.csv")),
            ..Default::default()
        };
        config
            .filters
            .insert("gender".to_string(), vec!["Female".to_string()]);

        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded, AppConfig::default());
    }
}
