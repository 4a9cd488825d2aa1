use super::models::Config;
use config::{ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "HANDLECHECK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/handlecheck.toml";
const ENV_PREFIX: &str = "HANDLECHECK";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    build(config_path, environment())
}

// HANDLECHECK__BACKOFF__MAX_DELAY -> backoff.max_delay
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

fn build(config_path: PathBuf, environment: Environment) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(
            File::from(config_path)
                .format(FileFormat::Toml)
                .required(false),
        );
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    builder = builder.add_source(environment);

    let config = builder.build()?;
    config.try_deserialize()
}
