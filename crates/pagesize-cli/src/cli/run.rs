//! Run the fetch pool and print the report.

use anyhow::Result;
use pagesize_core::config::{PagesizeConfig, RunTimeout};
use pagesize_core::coordinator::{self, RunPlan};
use pagesize_core::fetcher::CurlFetcher;
use pagesize_core::report;
use std::sync::Arc;

pub async fn run_fetch(cfg: &PagesizeConfig, timeout: RunTimeout) -> Result<()> {
    let plan = RunPlan::from_config(cfg, timeout);
    let fetcher = Arc::new(CurlFetcher::new(cfg.http()));

    let results = coordinator::run(plan, fetcher).await?;

    print!("{}", report::format_report(&results));
    if results.timed_out {
        tracing::info!(
            "{} worker(s) stopped at the deadline",
            results.cancelled_workers()
        );
    }
    Ok(())
}
