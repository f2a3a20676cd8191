//! Application configuration.
//!
//! Loaded from YAML files and environment variables into a single Config
//! struct consumed at startup by the storage layer.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "MARKETRUN_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "MARKETRUN";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "MARKETRUN_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum pool connections.
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/marketrun.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `MARKETRUN_CONFIG` environment variable (if set)
    /// 4. Environment variables with `MARKETRUN` prefix
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new("config", FileFormat::Yaml).required(false))
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.storage.path, "data/marketrun.db");
        assert_eq!(config.storage.max_connections, 5);
    }

    #[test]
    fn test_config_for_test() {
        let config = Config::for_test();
        assert_eq!(config.storage.max_connections, 5);
    }

    // Environment variables are process-global, so these run serially.
    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        std::env::set_var("MARKETRUN__STORAGE__MAX_CONNECTIONS", "9");
        let config = Config::load(None).expect("load config");
        std::env::remove_var("MARKETRUN__STORAGE__MAX_CONNECTIONS");
        assert_eq!(config.storage.max_connections, 9);
    }

    #[test]
    #[serial]
    fn test_env_absent_keeps_defaults() {
        std::env::remove_var("MARKETRUN__STORAGE__MAX_CONNECTIONS");
        let config = Config::load(None).expect("load config");
        assert_eq!(config.storage.max_connections, 5);
    }
}
