//! Configuration management for handlecheck
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use handlecheck::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Looking up handles at: {}", config.lookup.base_url);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `HANDLECHECK__<section>__<key>`
//!
//! Examples:
//! - `HANDLECHECK__LOOKUP__BASE_URL=http://localhost:9000/profiles`
//! - `HANDLECHECK__BACKOFF__MAX_DELAY=16s`
//! - `HANDLECHECK__OUTPUT__PATH=hits.txt`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/handlecheck.toml`.
//! This can be overridden using the `HANDLECHECK_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{BackoffSettings, Config, LookupSettings, OutputSettings};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`HANDLECHECK__*`)
    /// 2. TOML file (default: `config/handlecheck.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[output]\npath = \"found.txt\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.output.path, std::path::PathBuf::from("found.txt"));
        assert_eq!(config.backoff.to_policy().max_delay, Duration::from_secs(8));
    }

    #[test]
    fn test_validation_runs_after_loading() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[backoff]
initial_delay = "10s"
max_delay = "8s"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::MaxDelayBelowInitial { .. })
        ));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[lookup]
base_url = "https://api.mojang.com/users/profiles/minecraft"
connect_timeout = "5s"
request_timeout = "20s"
user_agent = "handlecheck-test"

[backoff]
initial_delay = "500ms"
max_delay = "4s"

[output]
path = "data/available.txt"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.lookup.user_agent, "handlecheck-test");
        assert_eq!(config.lookup.connect_timeout, HumanDuration::from_secs(5));

        let delays: Vec<_> = config.backoff.to_policy().schedule().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn test_to_toml_reloads_identically() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rendered.toml");

        let mut config = Config::default();
        config.backoff.max_delay = HumanDuration::from_secs(16);

        fs::write(&config_path, config.to_toml().unwrap()).unwrap();

        let reloaded = Config::load_from_path(config_path).unwrap();
        assert_eq!(reloaded.backoff.max_delay, HumanDuration::from_secs(16));
        assert_eq!(reloaded.lookup.base_url, config.lookup.base_url);
    }
}
