//! Scripted lookup for tests and offline runs

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::{LookupResponse, NetworkFault, ProfileLookup};
use crate::filter::Candidate;

/// Record of one lookup made against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub candidate: String,
    pub at: tokio::time::Instant,
}

/// Lookup that replays queued responses per candidate
///
/// Responses for a candidate are returned in FIFO order. Once a queue is
/// empty the fallback response is used; without a fallback the mock answers
/// with a 500 so the checker classifies it as inconclusive.
#[derive(Debug, Clone, Default)]
pub struct MockLookup {
    responses: Arc<Mutex<HashMap<String, VecDeque<Result<LookupResponse, NetworkFault>>>>>,
    fallback: Arc<Mutex<Option<Result<LookupResponse, NetworkFault>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `candidate`
    pub fn push(&self, candidate: &str, response: Result<LookupResponse, NetworkFault>) {
        self.responses
            .lock()
            .entry(candidate.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue a plain status with an empty body
    pub fn push_status(&self, candidate: &str, status: u16) {
        self.push(candidate, Ok(LookupResponse::new(status, "")));
    }

    /// Response used when nothing is queued for a candidate
    pub fn set_fallback(&self, response: Result<LookupResponse, NetworkFault>) {
        *self.fallback.lock() = Some(response);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of lookups made for one candidate
    pub fn calls_for(&self, candidate: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.candidate == candidate)
            .count()
    }
}

#[async_trait]
impl ProfileLookup for MockLookup {
    async fn lookup(&self, candidate: &Candidate) -> Result<LookupResponse, NetworkFault> {
        self.calls.lock().push(MockCall {
            candidate: candidate.to_string(),
            at: tokio::time::Instant::now(),
        });

        let queued = self
            .responses
            .lock()
            .get_mut(candidate.as_str())
            .and_then(VecDeque::pop_front);

        match queued {
            Some(response) => response,
            None => self.fallback.lock().clone().unwrap_or_else(|| {
                Ok(LookupResponse::new(
                    500,
                    format!("no mock response configured for {}", candidate),
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order_then_fallback() {
        let mock = MockLookup::new();
        mock.push_status("Steve", 429);
        mock.push_status("Steve", 200);
        mock.set_fallback(Ok(LookupResponse::new(404, "")));

        let steve = Candidate::parse("Steve").unwrap();
        assert_eq!(mock.lookup(&steve).await.unwrap().status, 429);
        assert_eq!(mock.lookup(&steve).await.unwrap().status, 200);
        assert_eq!(mock.lookup(&steve).await.unwrap().status, 404);

        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.calls_for("Steve"), 3);
        assert_eq!(mock.calls_for("Alex"), 0);
    }

    #[tokio::test]
    async fn test_mock_unconfigured_returns_server_error() {
        let mock = MockLookup::new();
        let alex = Candidate::parse("Alex").unwrap();

        let response = mock.lookup(&alex).await.unwrap();
        assert_eq!(response.status, 500);
        assert!(response.body.contains("Alex"));
    }

    #[tokio::test]
    async fn test_mock_replays_faults() {
        let mock = MockLookup::new();
        mock.push("Alex", Err(NetworkFault::Timeout));

        let alex = Candidate::parse("Alex").unwrap();
        assert_eq!(mock.lookup(&alex).await, Err(NetworkFault::Timeout));
    }
}
