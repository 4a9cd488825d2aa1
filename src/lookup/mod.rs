//! Profile lookup transport
//!
//! A lookup issues exactly one request and reports either the raw response
//! or a transport-level fault. Classifying statuses and retrying is left to
//! the [`crate::checker`].

pub mod http;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::filter::Candidate;

pub use http::{HttpLookup, LookupConfig};
pub use mock::{MockCall, MockLookup};

/// Transport faults: the request never produced an HTTP response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkFault {
    #[error("connection timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Errors building a lookup client
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Raw response from the profile service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub status: u16,
    pub body: String,
}

impl LookupResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Single-shot profile lookup
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Request the profile for `candidate` once, without retrying
    async fn lookup(&self, candidate: &Candidate) -> Result<LookupResponse, NetworkFault>;
}
