//! reqwest-backed profile lookup

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{LookupError, LookupResponse, NetworkFault, ProfileLookup};
use crate::filter::Candidate;

pub const DEFAULT_BASE_URL: &str = "https://api.mojang.com/users/profiles/minecraft";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("handlecheck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Looks up profiles over HTTP
#[derive(Debug, Clone)]
pub struct HttpLookup {
    client: Client,
    base_url: String,
}

impl HttpLookup {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LookupError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| LookupError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// URL queried for a candidate
    pub fn profile_url(&self, candidate: &Candidate) -> String {
        format!("{}/{}", self.base_url, candidate)
    }
}

#[async_trait]
impl ProfileLookup for HttpLookup {
    async fn lookup(&self, candidate: &Candidate) -> Result<LookupResponse, NetworkFault> {
        let url = self.profile_url(candidate);
        debug!(url, "Sending profile lookup");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkFault::Timeout
            } else if e.is_connect() {
                NetworkFault::Connect(e.to_string())
            } else {
                NetworkFault::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkFault::Body(e.to_string()))?;

        debug!(url, status, body_len = body.len(), "Profile lookup completed");

        Ok(LookupResponse { status, body })
    }
}
