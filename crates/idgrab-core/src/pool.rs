//! Bounded fetch-and-persist pool.
//!
//! Dispatches one task per ID in the configured range. A shared semaphore keeps
//! at most `concurrency` requests in flight; the `JoinSet` itself is capped at
//! a small multiple of that so a large range doesn't park thousands of idle tasks.
//! Returns only after every dispatched task has finished.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::config::FetchConfig;
use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::storage::ensure_output_dir;
use crate::summary::{RunSummary, TaskOutcome};
use crate::worker::{fetch_one, FetchContext};

/// Tasks allowed to wait for a slot, per slot.
const QUEUED_PER_SLOT: usize = 4;

/// Runs the whole ID range described by `cfg`.
///
/// Fails only on setup problems (invalid config, output directory cannot be
/// created). Per-task failures are logged by the task and counted in the summary.
pub async fn run_pool(cfg: &FetchConfig) -> Result<RunSummary> {
    cfg.validate()?;
    ensure_output_dir(&cfg.output_dir)?;

    let ctx = Arc::new(FetchContext::new(
        Endpoint::new(&cfg.base_url, &cfg.route)?,
        cfg.output_dir.clone(),
        cfg.request_timeout(),
    ));
    let slots = Arc::new(Semaphore::new(cfg.concurrency));
    let max_queued = cfg.concurrency.saturating_mul(QUEUED_PER_SLOT);
    let delay = cfg.dispatch_delay();

    tracing::info!(
        start = cfg.start_id,
        end = cfg.end_id,
        ids = cfg.id_count(),
        concurrency = cfg.concurrency,
        output_dir = %cfg.output_dir.display(),
        timeout_secs = cfg.request_timeout_secs,
        "starting download run"
    );

    let mut summary = RunSummary::default();
    let mut join_set = JoinSet::new();

    for id in cfg.start_id..=cfg.end_id {
        while join_set.len() >= max_queued {
            let Some(res) = join_set.join_next().await else {
                break;
            };
            record(&mut summary, res);
        }

        if let Some(delay) = delay {
            if summary.dispatched > 0 {
                tokio::time::sleep(delay).await;
            }
        }

        join_set.spawn(fetch_one(Arc::clone(&ctx), Arc::clone(&slots), id));
        summary.dispatched += 1;
    }

    while let Some(res) = join_set.join_next().await {
        record(&mut summary, res);
    }

    tracing::info!("all done: {}", summary);
    Ok(summary)
}

fn record(summary: &mut RunSummary, res: Result<TaskOutcome, JoinError>) {
    let outcome = res.unwrap_or_else(|e| {
        tracing::error!(error = %e, "download task panicked");
        TaskOutcome::Failed(FetchError::from(e))
    });
    summary.record(&outcome);
}
