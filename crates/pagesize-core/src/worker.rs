//! Fetch worker: WAITING → FETCHING → WAITING … → DONE.
//!
//! Each loop iteration first checks the deadline, then waits on the queue and
//! the deadline together. A fetch that has started always runs to completion
//! and is recorded; cancellation is only observed between fetches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::aggregate::ResultAggregator;
use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::queue::TaskReceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Waiting,
    Fetching,
    Done,
}

/// Why a worker reached DONE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Deadline fired.
    Cancelled,
    /// Queue closed and drained.
    Exhausted,
}

/// Returned by each worker when it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub fetches: usize,
    pub stop: StopReason,
}

/// Handles every worker in the pool shares.
#[derive(Clone)]
pub struct WorkerShared {
    pub queue: TaskReceiver,
    pub cancel: CancellationToken,
    pub fetcher: Arc<dyn Fetcher>,
    pub results: Arc<ResultAggregator>,
    /// Count of fetch invocations started across the pool.
    pub fetches_started: Arc<AtomicUsize>,
}

enum Wake {
    Cancelled,
    Exhausted,
    Task(String),
}

pub struct Worker {
    id: usize,
    state: watch::Sender<WorkerState>,
    shared: WorkerShared,
}

impl Worker {
    pub fn new(id: usize, shared: WorkerShared) -> Self {
        let (state, _) = watch::channel(WorkerState::Waiting);
        Self { id, state, shared }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Follow state transitions; the last value (`Done`) stays readable after `run` returns.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Run until the deadline fires or the queue is exhausted.
    pub async fn run(self) -> WorkerReport {
        let mut fetches = 0usize;
        let stop = loop {
            let id = match self.wait().await {
                Wake::Cancelled => {
                    tracing::info!(worker = self.id, "termination signal received, terminating");
                    break StopReason::Cancelled;
                }
                Wake::Exhausted => {
                    tracing::info!(worker = self.id, "no more pages to process");
                    break StopReason::Exhausted;
                }
                Wake::Task(id) => id,
            };

            self.state.send_replace(WorkerState::Fetching);
            tracing::debug!(worker = self.id, resource = %id, "received address to process");
            let outcome = self.fetch(&id).await;
            self.shared.results.record(&id, outcome);
            fetches += 1;
            tracing::debug!(worker = self.id, resource = %id, %outcome, "done processing");
            self.state.send_replace(WorkerState::Waiting);
        };
        self.state.send_replace(WorkerState::Done);
        WorkerReport {
            id: self.id,
            fetches,
            stop,
        }
    }

    async fn wait(&self) -> Wake {
        if self.shared.cancel.is_cancelled() {
            return Wake::Cancelled;
        }
        tokio::select! {
            biased;
            _ = self.shared.cancel.cancelled() => Wake::Cancelled,
            next = self.shared.queue.next() => match next {
                Some(id) => Wake::Task(id),
                None => Wake::Exhausted,
            },
        }
    }

    /// Invoke the fetcher on the blocking pool. Errors and panics become `Failed`.
    async fn fetch(&self, id: &str) -> FetchOutcome {
        self.shared.fetches_started.fetch_add(1, Ordering::SeqCst);
        let fetcher = Arc::clone(&self.shared.fetcher);
        let resource = id.to_string();
        let res = tokio::task::spawn_blocking(move || fetcher.fetch(&resource))
            .await
            .unwrap_or_else(|join| Err(FetchError::Aborted(join.to_string())));
        if let Err(e) = &res {
            tracing::warn!(worker = self.id, resource = %id, "error retrieving page: {}", e);
        }
        FetchOutcome::from(res)
    }
}
