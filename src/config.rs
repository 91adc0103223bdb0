use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::training::trainer::TrainerConfig;
use crate::weights::{JsonFileStore, WeightStore, DEFAULT_RECORD_KEY};

/// Deepest search the trainer accepts; copy-on-write boards get slow past this.
pub const MAX_DEPTH: usize = 6;

/// Where learned weights are kept.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub dir: PathBuf,
    pub record_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            dir: PathBuf::from("weights"),
            record_key: DEFAULT_RECORD_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Open the weight store on disk, falling back to defaults when nothing
    /// usable is saved yet.
    pub fn open(&self) -> WeightStore {
        WeightStore::load(
            Box::new(JsonFileStore::new(&self.dir)),
            self.record_key.clone(),
        )
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub training: TrainerConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let training = &self.training;
        if training.games_per_session == 0 {
            return Err(ConfigError::Validation(
                "training.games_per_session must be > 0".into(),
            ));
        }
        for (name, depth) in [
            ("depth_white", training.depth_white),
            ("depth_black", training.depth_black),
        ] {
            if !(1..=MAX_DEPTH).contains(&depth) {
                return Err(ConfigError::Validation(format!(
                    "training.{name} must be in 1..={MAX_DEPTH}"
                )));
            }
        }
        if training.max_plies == 0 {
            return Err(ConfigError::Validation(
                "training.max_plies must be > 0".into(),
            ));
        }
        if training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if self.store.record_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.record_key must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.store.dir, PathBuf::from("weights"));
        assert_eq!(config.store.record_key, "learned_weights");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[training]
depth_white = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.training.depth_white, 3);
        // Other fields should be defaults
        assert_eq!(config.training.depth_black, 2);
        assert_eq!(config.training.games_per_session, 10);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validation_rejects_zero_games() {
        let mut config = AppConfig::default();
        config.training.games_per_session = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_depth_out_of_range() {
        let mut config = AppConfig::default();
        config.training.depth_black = 0;
        assert!(config.validate().is_err());

        config.training.depth_black = MAX_DEPTH + 1;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "config validation error: training.depth_black must be in 1..=6"
        );
    }

    #[test]
    fn test_validation_rejects_zero_max_plies() {
        let mut config = AppConfig::default();
        config.training.max_plies = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_log_interval() {
        let mut config = AppConfig::default();
        config.training.log_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_blank_record_key() {
        let mut config = AppConfig::default();
        config.store.record_key = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.training.games_per_session, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[training]
games_per_session = 500
seed = 42

[store]
dir = "runs/a"
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.training.games_per_session, 500);
        assert_eq!(config.training.seed, Some(42));
        assert_eq!(config.store.dir, PathBuf::from("runs/a"));
        // Others are defaults
        assert_eq!(config.training.max_plies, 200);
        assert_eq!(config.store.record_key, "learned_weights");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[training]\nmax_plies = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[training\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_store_config_opens_weights_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            dir: dir.path().to_path_buf(),
            record_key: "session".into(),
        };
        let mut store = config.open();
        store.update(|w| w.wins = 4);
        assert!(dir.path().join("session.json").exists());
        assert_eq!(config.open().weights().wins, 4);
    }
}
