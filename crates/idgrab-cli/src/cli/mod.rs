//! CLI for the idgrab bulk downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use idgrab_core::config::{self, FetchConfig};
use std::path::PathBuf;

pub use commands::RunArgs;
use commands::{run_download, run_show_config, run_url};

/// Top-level CLI for idgrab.
#[derive(Debug, Parser)]
#[command(name = "idgrab")]
#[command(about = "idgrab: download every file in a numeric download-ID range", long_about = None)]
pub struct Cli {
    /// Read settings from this TOML file instead of ~/.config/idgrab/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log to ~/.local/state/idgrab/idgrab.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every ID in the range. Flags override the config file.
    Run(RunArgs),

    /// Print the effective configuration.
    Config,

    /// Print the request URL for one download ID without fetching it.
    Url {
        /// Download identifier.
        id: u64,
    },
}

impl Cli {
    /// Loads config and dispatches. Returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        let (cfg, source) = match &self.config {
            Some(path) => (config::load_from_path(path)?, path.clone()),
            None => (config::load_or_init()?, config::config_path()?),
        };
        tracing::debug!("loaded config from {}: {:?}", source.display(), cfg);

        match self.command {
            CliCommand::Run(args) => run_download(cfg, &args).await,
            CliCommand::Config => run_show_config(&cfg, &source),
            CliCommand::Url { id } => run_url(&cfg, id),
        }
    }
}

/// Applies the flags that were given on top of the loaded config.
pub(crate) fn apply_overrides(mut cfg: FetchConfig, args: &RunArgs) -> FetchConfig {
    if let Some(start) = args.start {
        cfg.start_id = start;
    }
    if let Some(end) = args.end {
        cfg.end_id = end;
    }
    if let Some(c) = args.concurrency {
        cfg.concurrency = c;
    }
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    if let Some(t) = args.timeout {
        cfg.request_timeout_secs = t;
    }
    if let Some(d) = args.delay_ms {
        cfg.dispatch_delay_ms = d;
    }
    if let Some(url) = &args.base_url {
        cfg.base_url = url.clone();
    }
    if let Some(route) = &args.route {
        cfg.route = route.clone();
    }
    cfg
}

#[cfg(test)]
mod tests;
