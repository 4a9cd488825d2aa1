use handlecheck::batch::{BatchRunner, BatchSummary};
use handlecheck::checker::AvailabilityChecker;
use handlecheck::config::{Config, ConfigError};
use handlecheck::filter::read_candidates;
use handlecheck::lookup::HttpLookup;
use handlecheck::observability::{Metrics, MetricsSnapshot};
use handlecheck::sink::{AppendFileSink, ResultSink};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::{CheckArgs, ConfigArgs, FilterArgs};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// JSON output of `check --json`
#[derive(Serialize)]
struct CheckReport<'a> {
    #[serde(flatten)]
    summary: &'a BatchSummary,
    metrics: MetricsSnapshot,
}

fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

pub async fn check(args: CheckArgs) -> Result<(), AnyError> {
    let mut config = load_config(args.config)?;
    if let Some(output) = args.output {
        config.output.path = output;
    }

    let candidates = read_candidates(&args.input)?;
    if candidates.is_empty() {
        warn!(input = %args.input.display(), "No valid usernames loaded, nothing to check");
        return Ok(());
    }
    info!(count = candidates.len(), input = %args.input.display(), "Loaded usernames");

    let lookup = HttpLookup::new(config.lookup.to_lookup_config())?;
    let metrics = Arc::new(Metrics::new());
    let checker =
        AvailabilityChecker::new(lookup, config.backoff.to_policy()).with_metrics(metrics.clone());
    let runner = BatchRunner::new(checker);
    let sink = AppendFileSink::new(&config.output.path);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let summary = runner
        .run(
            &candidates,
            &cancel,
            |progress| {
                info!(
                    "Progress: {:.2}% | Checked {}: Available {}",
                    progress.percent(),
                    progress.checked,
                    progress.available
                )
            },
            |candidate| {
                info!(%candidate, "Available");
                tokio::task::block_in_place(|| sink.record_available(candidate))
            },
        )
        .await;

    let snapshot = metrics.snapshot();
    info!(
        lookups = snapshot.lookups_sent,
        rate_limited = snapshot.rate_limited,
        network_faults = snapshot.network_faults,
        "Lookup statistics"
    );

    if summary.persist_failures > 0 {
        warn!(
            failures = summary.persist_failures,
            path = %sink.path().display(),
            "Some available usernames could not be written"
        );
    }

    if args.json {
        let report = CheckReport {
            summary: &summary,
            metrics: snapshot,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if summary.cancelled {
        println!(
            "Username checking stopped after {} of {}. Found {} available usernames.",
            summary.total_checked,
            candidates.len(),
            summary.total_available
        );
    } else {
        println!(
            "Username checking complete. Found {} available usernames.",
            summary.total_available
        );
    }

    Ok(())
}

pub fn filter(args: FilterArgs) -> Result<(), AnyError> {
    let candidates = read_candidates(&args.input)?;
    for candidate in &candidates {
        println!("{}", candidate);
    }
    info!(count = candidates.len(), "Valid usernames");
    Ok(())
}

pub fn show_config(args: ConfigArgs) -> Result<(), AnyError> {
    let config = load_config(args.config)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Cancel the batch on the first signal, exit on the second
async fn cancel_on_signal(cancel: CancellationToken) {
    shutdown_signal().await;
    warn!("Interrupt received, stopping after the current username (repeat to exit now)");
    cancel.cancel();

    shutdown_signal().await;
    warn!("Second interrupt received, exiting");
    std::process::exit(130);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
