//! Sequential batch orchestration
//!
//! Candidates are checked one at a time, in input order. Hits are handed to
//! the `on_available` callback before the `on_progress` callback fires for the
//! same candidate. Failures never stop the batch; only cancellation does, and
//! it is observed between candidates.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::checker::{AvailabilityChecker, Verdict};
use crate::filter::Candidate;
use crate::lookup::ProfileLookup;
use crate::sink::SinkError;

/// Cumulative counts after a candidate has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub checked: usize,
    pub available: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.checked as f64 / self.total as f64 * 100.0
    }
}

/// Totals for a finished or cancelled run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_checked: usize,
    pub total_available: usize,
    pub total_taken: usize,
    pub total_inconclusive: usize,
    /// Available handles the sink failed to record
    pub persist_failures: usize,
    pub cancelled: bool,
}

/// Drives candidates through an [`AvailabilityChecker`]
#[derive(Debug)]
pub struct BatchRunner<L> {
    checker: AvailabilityChecker<L>,
}

impl<L: ProfileLookup> BatchRunner<L> {
    pub fn new(checker: AvailabilityChecker<L>) -> Self {
        Self { checker }
    }

    /// Check every candidate in order
    ///
    /// `on_progress` is called exactly once per processed candidate.
    /// `on_available` is called only for available candidates; an error from
    /// it is logged and counted but the candidate still counts as available.
    pub async fn run<P, A>(
        &self,
        candidates: &[Candidate],
        cancel: &CancellationToken,
        mut on_progress: P,
        mut on_available: A,
    ) -> BatchSummary
    where
        P: FnMut(Progress),
        A: FnMut(&Candidate) -> Result<(), SinkError>,
    {
        let total = candidates.len();
        let mut summary = BatchSummary::default();

        info!(total, "Starting batch");

        for candidate in candidates {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                warn!(
                    checked = summary.total_checked,
                    remaining = total - summary.total_checked,
                    "Batch cancelled"
                );
                break;
            }

            let outcome = self.checker.check(candidate).await;

            match outcome.verdict {
                Verdict::Available => {
                    summary.total_available += 1;
                    if let Err(e) = on_available(candidate) {
                        summary.persist_failures += 1;
                        warn!(%candidate, error = %e, "Failed to record available handle");
                    }
                }
                Verdict::Taken => summary.total_taken += 1,
                Verdict::Inconclusive => {
                    summary.total_inconclusive += 1;
                    warn!(
                        %candidate,
                        diagnostic = outcome.diagnostic.as_deref().unwrap_or(""),
                        "Check inconclusive"
                    );
                }
            }

            summary.total_checked += 1;
            on_progress(Progress {
                checked: summary.total_checked,
                available: summary.total_available,
                total,
            });
        }

        info!(
            checked = summary.total_checked,
            available = summary.total_available,
            inconclusive = summary.total_inconclusive,
            cancelled = summary.cancelled,
            "Batch finished"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::BackoffPolicy;
    use crate::filter::filter_candidates;
    use crate::lookup::MockLookup;
    use std::cell::RefCell;

    fn runner(mock: &MockLookup) -> BatchRunner<MockLookup> {
        BatchRunner::new(AvailabilityChecker::new(mock.clone(), BackoffPolicy::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_once_per_candidate() {
        let mock = MockLookup::new();
        mock.push_status("a", 404);
        mock.push_status("b", 200);
        mock.push_status("c", 404);
        mock.push_status("d", 418);

        let candidates = filter_candidates(["a", "b", "c", "d"]);
        let mut progress = Vec::new();

        let summary = runner(&mock)
            .run(
                &candidates,
                &CancellationToken::new(),
                |p| progress.push(p),
                |_| Ok(()),
            )
            .await;

        let checked: Vec<usize> = progress.iter().map(|p| p.checked).collect();
        let available: Vec<usize> = progress.iter().map(|p| p.available).collect();
        assert_eq!(checked, vec![1, 2, 3, 4]);
        assert_eq!(available, vec![1, 1, 2, 2]);
        assert!(progress.iter().all(|p| p.total == 4));

        assert_eq!(
            summary,
            BatchSummary {
                total_checked: 4,
                total_available: 2,
                total_taken: 1,
                total_inconclusive: 1,
                persist_failures: 0,
                cancelled: false,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_available_reported_before_progress() {
        let mock = MockLookup::new();
        mock.push_status("taken", 200);
        mock.push_status("free", 404);

        let candidates = filter_candidates(["taken", "free"]);
        let events = RefCell::new(Vec::new());

        runner(&mock)
            .run(
                &candidates,
                &CancellationToken::new(),
                |p| events.borrow_mut().push(format!("progress:{}", p.checked)),
                |c| {
                    events.borrow_mut().push(format!("available:{}", c));
                    Ok(())
                },
            )
            .await;

        assert_eq!(
            events.into_inner(),
            vec!["progress:1", "available:free", "progress:2"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_checks_nothing() {
        let mock = MockLookup::new();
        let candidates = filter_candidates(["a", "b"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut calls = 0;
        let summary = runner(&mock)
            .run(&candidates, &cancel, |_| calls += 1, |_| Ok(()))
            .await;

        assert_eq!(calls, 0);
        assert_eq!(mock.call_count(), 0);
        assert!(summary.cancelled);
        assert_eq!(summary.total_checked, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_observed_at_candidate_boundary() {
        let mock = MockLookup::new();
        mock.push_status("a", 429);
        mock.push_status("a", 404);
        mock.set_fallback(Ok(crate::lookup::LookupResponse::new(200, "")));

        let candidates = filter_candidates(["a", "b", "c"]);
        let cancel = CancellationToken::new();

        let summary = runner(&mock)
            .run(
                &candidates,
                &cancel,
                |p| {
                    if p.checked == 1 {
                        cancel.cancel();
                    }
                },
                |_| Ok(()),
            )
            .await;

        // The first candidate finished its retry before cancellation took hold
        assert_eq!(mock.calls_for("a"), 2);
        assert_eq!(mock.calls_for("b"), 0);
        assert!(summary.cancelled);
        assert_eq!(summary.total_checked, 1);
        assert_eq!(summary.total_available, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch() {
        let mock = MockLookup::new();
        let summary = runner(&mock)
            .run(&[], &CancellationToken::new(), |_| {}, |_| Ok(()))
            .await;

        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_progress_percent() {
        let progress = Progress {
            checked: 1,
            available: 0,
            total: 4,
        };
        assert_eq!(progress.percent(), 25.0);

        let empty = Progress {
            checked: 0,
            available: 0,
            total: 0,
        };
        assert_eq!(empty.percent(), 100.0);
    }
}
