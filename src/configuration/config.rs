use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, LevelFilter};
use serde::Deserialize;

use crate::error_handling::types::ConfigError;
use crate::storage::phash_storage::DEFAULT_STORAGE_DIR;

/// Environment variable overriding `storage_dir`.
pub const STORAGE_DIR_ENV: &str = "PHASH_STORAGE_DIR";

/// Runtime configuration for the phash storage tools.
///
/// Loaded from a TOML file such as:
///
/// ```toml
/// storage_dir = ".inline-snapshot/phash"
/// log_level = "debug"
/// ```
///
/// # Fields Overview
///
/// - `storage_dir`: directory holding the stored artifacts and the `.gitignore` marker
/// - `log_level`: default verbosity when `RUST_LOG` is not set
///
/// Missing keys fall back to their defaults, and `PHASH_STORAGE_DIR` takes
/// precedence over the file's `storage_dir`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage_dir: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parses and validates a configuration file. Environment overrides are not applied.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration read from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the effective configuration: the file at `path` when given,
    /// otherwise the defaults, then the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Ok(dir) = std::env::var(STORAGE_DIR_ENV) {
            debug!("Using storage dir from {}: {}", STORAGE_DIR_ENV, dir);
            config.storage_dir = PathBuf::from(dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("storage_dir must not be empty".to_string()));
        }
        if self.storage_dir.is_file() {
            return Err(ConfigError::InvalidValue(format!(
                "storage_dir {} is a file",
                self.storage_dir.display()
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidValue(format!("unknown log level {:?}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage_dir, PathBuf::from(".inline-snapshot/phash"));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str("log_level = \"debug\"\n").unwrap();
        assert_eq!(config.storage_dir, PathBuf::from(".inline-snapshot/phash"));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("log_level = \"loud\"\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_toml_str("storage_dir = \"\"\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_toml_str("storage = \"x\"\n"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        std::env::remove_var(STORAGE_DIR_ENV);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phash.toml");
        fs::write(&path, "storage_dir = \"snapshots/phash\"\nlog_level = \"warn\"\n").unwrap();
        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("snapshots/phash"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phash.toml");
        fs::write(&path, "storage_dir = \"snapshots/phash\"\n").unwrap();
        std::env::set_var(STORAGE_DIR_ENV, "/tmp/from-env");
        let config = Config::load(Some(path.as_path()));
        std::env::remove_var(STORAGE_DIR_ENV);
        assert_eq!(config.unwrap().storage_dir, PathBuf::from("/tmp/from-env"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_is_io_error() {
        std::env::remove_var(STORAGE_DIR_ENV);
        let err = Config::load(Some(Path::new("/nonexistent/phash.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
