use crate::checker::BackoffPolicy;
use crate::humanize::HumanDuration;
use crate::lookup::LookupConfig;
use crate::lookup::http::DEFAULT_BASE_URL;
use crate::sink::DEFAULT_OUTPUT_PATH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupSettings,
    #[serde(default)]
    pub backoff: BackoffSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Remote profile service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupSettings {
    /// Profile endpoint; the candidate is appended as the last path segment
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl LookupSettings {
    pub fn to_lookup_config(&self) -> LookupConfig {
        LookupConfig {
            base_url: self.base_url.clone(),
            connect_timeout: self.connect_timeout.as_duration(),
            request_timeout: self.request_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("handlecheck/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Retry backoff for rate limits and transport faults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackoffSettings {
    #[serde(default = "default_initial_delay")]
    pub initial_delay: HumanDuration,
    #[serde(default = "default_max_delay")]
    pub max_delay: HumanDuration,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
        }
    }
}

impl BackoffSettings {
    pub fn to_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.initial_delay.as_duration(), self.max_delay.as_duration())
    }
}

fn default_initial_delay() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_max_delay() -> HumanDuration {
    HumanDuration::from_secs(8)
}

/// Where available handles are appended
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}
