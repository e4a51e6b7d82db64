//! CLI for pagesize.

mod run;

use anyhow::Result;
use clap::Parser;
use pagesize_core::config::{self, PagesizeConfig, RunTimeout};
use std::path::PathBuf;

/// Fetch a fixed list of pages concurrently and report their sizes,
/// giving up on unfinished work once the timeout elapses.
#[derive(Debug, Parser)]
#[command(name = "pagesize")]
#[command(about = "pagesize: concurrent page-size fetcher with a global deadline", long_about = None)]
#[command(after_help = "Example: pagesize 10")]
pub struct Cli {
    /// Global timeout in seconds (positive integer).
    #[arg(value_name = "TIMEOUT_SECS", value_parser = config::parse_timeout, allow_negative_numbers = true)]
    pub timeout: RunTimeout,

    /// Number of concurrent workers (overrides config).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Task queue capacity (overrides config).
    #[arg(long, value_name = "C")]
    pub queue_capacity: Option<usize>,

    /// Page to fetch; repeat to replace the configured target list.
    #[arg(long = "target", value_name = "ID")]
    pub targets: Vec<String>,

    /// Read config from this TOML file instead of ~/.config/pagesize/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.resolve_config()?;
        tracing::debug!("effective config: {:?}", cfg);
        run::run_fetch(&cfg, cli.timeout).await
    }

    /// Load the config file and apply command-line overrides on top.
    fn resolve_config(&self) -> Result<PagesizeConfig> {
        let cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        let cfg = self.apply_overrides(cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_overrides(&self, mut cfg: PagesizeConfig) -> PagesizeConfig {
        if let Some(n) = self.workers {
            cfg.workers = n;
        }
        if let Some(c) = self.queue_capacity {
            cfg.queue_capacity = c;
        }
        if !self.targets.is_empty() {
            cfg.targets = self.targets.clone();
        }
        cfg
    }
}
