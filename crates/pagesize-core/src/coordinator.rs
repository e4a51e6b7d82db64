//! Run coordinator: deadline + producer + worker pool, joined into one result.
//!
//! The coordinator waits for the workers only. The producer and the deadline
//! timer are detached; the timer is disarmed once the pool has drained.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::aggregate::ResultAggregator;
use crate::config::{self, PagesizeConfig, RunTimeout};
use crate::deadline::Deadline;
use crate::error::ConfigError;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::queue;
use crate::worker::{StopReason, Worker, WorkerReport, WorkerShared};

/// Everything one run needs, resolved from config and the CLI.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub targets: Vec<String>,
    pub workers: usize,
    pub queue_capacity: usize,
    pub timeout: RunTimeout,
}

impl RunPlan {
    pub fn from_config(cfg: &PagesizeConfig, timeout: RunTimeout) -> Self {
        Self {
            targets: cfg.targets.clone(),
            workers: cfg.workers,
            queue_capacity: cfg.queue_capacity,
            timeout,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        config::validate_pool(self.workers, self.queue_capacity)
    }
}

/// Final, owned outcome of a run. Built only after every worker has exited.
#[derive(Debug, Clone)]
pub struct RunResults {
    pub outcomes: HashMap<String, FetchOutcome>,
    /// Sum of successful lengths.
    pub total: u64,
    /// Number of identifiers in the plan.
    pub targets: usize,
    /// At least one worker stopped on the deadline rather than on an empty queue.
    pub timed_out: bool,
    pub fetches_started: usize,
    /// One per worker that exited normally, ordered by worker id.
    pub workers: Vec<WorkerReport>,
    pub elapsed: Duration,
}

impl RunResults {
    pub fn failed_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failed()).count()
    }

    pub fn cancelled_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| w.stop == StopReason::Cancelled)
            .count()
    }
}

/// The run was cut short only if some worker left its loop on cancellation; a
/// timer that fires after the pool has drained does not count.
fn deadline_hit(reports: &[WorkerReport]) -> bool {
    reports.iter().any(|r| r.stop == StopReason::Cancelled)
}

/// Fetch every target in `plan` with `plan.workers` concurrent workers, bounded by
/// `plan.timeout`. Only configuration problems are returned as errors; fetch
/// failures end up as `FetchOutcome::Failed` entries.
pub async fn run(plan: RunPlan, fetcher: Arc<dyn Fetcher>) -> Result<RunResults, ConfigError> {
    plan.validate()?;
    let started = Instant::now();
    let target_count = plan.targets.len();
    tracing::info!(
        targets = target_count,
        workers = plan.workers,
        queue_capacity = plan.queue_capacity,
        timeout = ?plan.timeout.duration(),
        "starting run"
    );

    let deadline = Deadline::start(plan.timeout);
    let results = Arc::new(ResultAggregator::new());
    let fetches_started = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = queue::bounded(plan.queue_capacity);

    let shared = WorkerShared {
        queue: rx,
        cancel: deadline.signal(),
        fetcher,
        results: Arc::clone(&results),
        fetches_started: Arc::clone(&fetches_started),
    };
    let mut pool = JoinSet::new();
    for worker_id in 1..=plan.workers {
        pool.spawn(Worker::new(worker_id, shared.clone()).run());
    }
    // Workers now hold the only receivers; the producer stops if they all exit.
    drop(shared);

    let _producer = queue::spawn_producer(plan.targets, tx, deadline.signal());

    let mut reports = Vec::with_capacity(plan.workers);
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("worker task failed: {}", e),
        }
    }
    reports.sort_by_key(|r| r.id);

    let timed_out = deadline_hit(&reports);
    drop(deadline);

    let snapshot = match Arc::try_unwrap(results) {
        Ok(agg) => agg.into_snapshot(),
        Err(shared) => shared.snapshot(),
    };
    let run = RunResults {
        outcomes: snapshot.outcomes,
        total: snapshot.total,
        targets: target_count,
        timed_out,
        fetches_started: fetches_started.load(Ordering::SeqCst),
        workers: reports,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        recorded = run.outcomes.len(),
        failed = run.failed_count(),
        total_bytes = run.total,
        timed_out = run.timed_out,
        elapsed = ?run.elapsed,
        "run completed"
    );
    Ok(run)
}
