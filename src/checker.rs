//! Availability checking with bounded exponential backoff
//!
//! One call to [`AvailabilityChecker::check`] drives a candidate through
//! repeated lookups until the service gives a terminal answer or the backoff
//! schedule runs out:
//!
//! - `200` means the handle is taken
//! - `404` means the handle is available
//! - `429` and transport faults wait for the next backoff delay and retry
//! - any other status is inconclusive and is not retried
//!
//! With the default policy the waits are exactly 1s, 2s, 4s and 8s, so a
//! candidate sees at most five lookups.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::filter::Candidate;
use crate::lookup::{LookupResponse, NetworkFault, ProfileLookup};
use crate::observability::Metrics;

/// Diagnostic attached when the backoff schedule runs out
pub const RETRIES_EXHAUSTED: &str = "retries exhausted";

/// Terminal classification of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Taken,
    Available,
    Inconclusive,
}

/// Result of checking one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    /// Time from the first attempt to the terminal answer or exhaustion
    pub elapsed: Duration,
    /// Set for inconclusive outcomes
    pub diagnostic: Option<String>,
    pub attempts: u32,
    /// Backoff waits performed, in order
    pub waits: Vec<Duration>,
}

impl CheckOutcome {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Backoff bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl BackoffPolicy {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
        }
    }

    /// Fresh delay sequence for one candidate
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            next: Some(self.initial_delay.min(self.max_delay)),
            max: self.max_delay,
        }
    }
}

/// Doubling delays, clamped to the cap
///
/// The delay that reaches the cap is yielded once, then the schedule ends.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    next: Option<Duration>,
    max: Duration,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next?;
        self.next = if current >= self.max || current.is_zero() {
            None
        } else {
            Some(current.saturating_mul(2).min(self.max))
        };
        Some(current)
    }
}

enum Step {
    Done {
        verdict: Verdict,
        diagnostic: Option<String>,
    },
    RateLimited,
    Fault(NetworkFault),
}

fn classify(result: Result<LookupResponse, NetworkFault>) -> Step {
    match result {
        Ok(response) => match response.status {
            200 => Step::Done {
                verdict: Verdict::Taken,
                diagnostic: None,
            },
            404 => Step::Done {
                verdict: Verdict::Available,
                diagnostic: None,
            },
            429 => Step::RateLimited,
            status => {
                warn!(status, body = %response.body, "Unexpected lookup response");
                Step::Done {
                    verdict: Verdict::Inconclusive,
                    diagnostic: Some(response.body),
                }
            }
        },
        Err(fault) => Step::Fault(fault),
    }
}

/// Checks one candidate at a time against a [`ProfileLookup`]
#[derive(Debug)]
pub struct AvailabilityChecker<L> {
    lookup: L,
    backoff: BackoffPolicy,
    metrics: Arc<Metrics>,
}

impl<L: ProfileLookup> AvailabilityChecker<L> {
    pub fn new(lookup: L, backoff: BackoffPolicy) -> Self {
        Self {
            lookup,
            backoff,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Share counters with the caller
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Look up `candidate`, backing off on rate limits and transport faults
    pub async fn check(&self, candidate: &Candidate) -> CheckOutcome {
        let started = Instant::now();
        let mut schedule = self.backoff.schedule();
        let mut waits = Vec::new();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            self.metrics.lookup_sent();

            let reason = match classify(self.lookup.lookup(candidate).await) {
                Step::Done {
                    verdict,
                    diagnostic,
                } => {
                    let outcome = CheckOutcome {
                        verdict,
                        elapsed: started.elapsed(),
                        diagnostic,
                        attempts,
                        waits,
                    };
                    self.record(candidate, &outcome);
                    return outcome;
                }
                Step::RateLimited => {
                    self.metrics.rate_limited();
                    "rate limited".to_string()
                }
                Step::Fault(fault) => {
                    self.metrics.network_fault();
                    fault.to_string()
                }
            };

            let Some(delay) = schedule.next() else {
                warn!(%candidate, attempts, reason = %reason, "Retries exhausted");
                let outcome = CheckOutcome {
                    verdict: Verdict::Inconclusive,
                    elapsed: started.elapsed(),
                    diagnostic: Some(RETRIES_EXHAUSTED.to_string()),
                    attempts,
                    waits,
                };
                self.record(candidate, &outcome);
                return outcome;
            };

            warn!(
                %candidate,
                attempt = attempts,
                retry_in = ?delay,
                reason = %reason,
                "Lookup deferred, retrying"
            );
            tokio::time::sleep(delay).await;
            waits.push(delay);
        }
    }

    fn record(&self, candidate: &Candidate, outcome: &CheckOutcome) {
        match outcome.verdict {
            Verdict::Taken => self.metrics.taken(),
            Verdict::Available => self.metrics.available(),
            Verdict::Inconclusive => self.metrics.inconclusive(),
        }
        debug!(
            %candidate,
            verdict = ?outcome.verdict,
            attempts = outcome.attempts,
            elapsed_secs = outcome.elapsed_secs(),
            "Check finished"
        );
    }
}
