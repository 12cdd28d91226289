//! `idgrab run` – download every ID in the configured range.

use anyhow::Result;
use clap::Args;
use idgrab_core::config::FetchConfig;
use idgrab_core::run_pool;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::apply_overrides;

/// Exit code when the run finished but some downloads failed.
const EXIT_TASK_FAILURES: i32 = 2;

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// First download ID (inclusive).
    #[arg(long, value_name = "ID")]
    pub start: Option<u64>,

    /// Last download ID (inclusive).
    #[arg(long, value_name = "ID")]
    pub end: Option<u64>,

    /// Maximum number of requests in flight.
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Directory to write files into (created if missing).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Pause between dispatching consecutive IDs, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Download endpoint (query string is replaced).
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Value of the `route` query parameter.
    #[arg(long)]
    pub route: Option<String>,
}

pub async fn run_download(cfg: FetchConfig, args: &RunArgs) -> Result<i32> {
    let cfg = apply_overrides(cfg, args);
    cfg.validate()?;

    let started = Instant::now();
    let summary = run_pool(&cfg).await?;

    println!("{} in {:.1}s", summary, started.elapsed().as_secs_f64());

    if summary.has_failures() {
        tracing::warn!("{} download(s) failed", summary.failed);
        return Ok(EXIT_TASK_FAILURES);
    }
    Ok(0)
}
