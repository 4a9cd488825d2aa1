//! Tracing setup and lookup counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber on stderr, honoring `RUST_LOG` (default `info`)
///
/// Logs stay off stdout so command output can be piped.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Counters for lookups and their verdicts
#[derive(Debug, Default)]
pub struct Metrics {
    lookups_sent: AtomicU64,
    rate_limited: AtomicU64,
    network_faults: AtomicU64,
    taken: AtomicU64,
    available: AtomicU64,
    inconclusive: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_sent(&self) {
        self.lookups_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "rate_limited", "Metric incremented");
    }

    pub fn network_fault(&self) {
        self.network_faults.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "network_faults", "Metric incremented");
    }

    pub fn taken(&self) {
        self.taken.fetch_add(1, Ordering::Relaxed);
    }

    pub fn available(&self) {
        self.available.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inconclusive(&self) {
        self.inconclusive.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups_sent: self.lookups_sent.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            network_faults: self.network_faults.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
            available: self.available.load(Ordering::Relaxed),
            inconclusive: self.inconclusive.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lookups_sent: u64,
    pub rate_limited: u64,
    pub network_faults: u64,
    pub taken: u64,
    pub available: u64,
    pub inconclusive: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = Metrics::new();
        metrics.lookup_sent();
        metrics.lookup_sent();
        metrics.rate_limited();
        metrics.taken();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lookups_sent, 2);
        assert_eq!(snapshot.rate_limited, 1);
        assert_eq!(snapshot.taken, 1);
        assert_eq!(snapshot.available, 0);
    }
}
