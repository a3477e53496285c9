use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DRIVE_DIR: &str = "drive";
const DEFAULT_LEGACY_DB: &str = "beaker.db";

/// Configuration, stored as `config.json` in the data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory backing the drive. Defaults to `<data dir>/drive`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_root: Option<PathBuf>,

    /// Legacy SQLite database to migrate from. Defaults to `<data dir>/beaker.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_db: Option<PathBuf>,
}

impl StoreConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(StoreError::Io)?;
        let config: StoreConfig =
            serde_json::from_str(&content).map_err(StoreError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(StoreError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(StoreError::Serialization)?;
        fs::write(config_path, content).map_err(StoreError::Io)?;
        Ok(())
    }

    /// Configured value of `key`; `None` when it is left at the default.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "drive_root" => self.drive_root.as_ref(),
            "legacy_db" => self.legacy_db.as_ref(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value.map(|p| p.display().to_string()))
    }

    /// Set `key`. An empty value clears it back to the default.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key {
            "drive_root" => &mut self.drive_root,
            "legacy_db" => &mut self.legacy_db,
            _ => return Err(unknown_key(key)),
        };
        *slot = (!value.is_empty()).then(|| PathBuf::from(value));
        Ok(())
    }

    pub fn drive_root(&self, data_dir: &Path) -> PathBuf {
        self.drive_root
            .clone()
            .unwrap_or_else(|| data_dir.join(DEFAULT_DRIVE_DIR))
    }

    pub fn legacy_db(&self, data_dir: &Path) -> PathBuf {
        self.legacy_db
            .clone()
            .unwrap_or_else(|| data_dir.join(DEFAULT_LEGACY_DB))
    }
}

fn unknown_key(key: &str) -> StoreError {
    StoreError::InvalidConfig(format!("Unknown config key: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_under_data_dir() {
        let config = StoreConfig::default();
        let data = Path::new("/tmp/pdastore");
        assert_eq!(config.drive_root(data), data.join("drive"));
        assert_eq!(config.legacy_db(data), data.join("beaker.db"));
    }

    #[test]
    fn explicit_paths_win() {
        let config = StoreConfig {
            drive_root: Some(PathBuf::from("/srv/drive")),
            legacy_db: None,
        };
        assert_eq!(
            config.drive_root(Path::new("/ignored")),
            PathBuf::from("/srv/drive")
        );
    }

    #[test]
    fn load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested");

        let config = StoreConfig {
            drive_root: Some(PathBuf::from("/srv/drive")),
            legacy_db: Some(PathBuf::from("/srv/old.db")),
        };
        config.save(&dir).unwrap();

        assert_eq!(StoreConfig::load(&dir).unwrap(), config);
    }

    #[test]
    fn set_then_get() {
        let mut config = StoreConfig::default();
        config.set("legacy_db", "/srv/old.db").unwrap();
        assert_eq!(
            config.get("legacy_db").unwrap().as_deref(),
            Some("/srv/old.db")
        );
        assert_eq!(config.get("drive_root").unwrap(), None);

        config.set("legacy_db", "").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn set_unknown_key_fails() {
        let mut config = StoreConfig::default();
        let err = config.set("file_ext", ".md").unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
        assert!(config.get("file_ext").is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let parsed: StoreConfig = serde_json::from_str(r#"{"file_ext": ".txt"}"#).unwrap();
        assert_eq!(parsed, StoreConfig::default());
    }
}
