//! Shared result aggregate: outcome per resource plus running byte total.
//!
//! Workers hold an `Arc<ResultAggregator>` and only ever call `record`. The map
//! and total live behind one lock so an update is never half-visible.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::fetcher::FetchOutcome;

#[derive(Debug, Default)]
struct Aggregate {
    outcomes: HashMap<String, FetchOutcome>,
    total: u64,
}

/// Mutually-exclusive accumulator shared by all workers during a run.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    inner: Mutex<Aggregate>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `id`, replacing any earlier entry.
    /// Successful lengths are added to the total; a replaced success is taken back out first.
    pub fn record(&self, id: &str, outcome: FetchOutcome) {
        let mut agg = self.lock();
        let previous = agg.outcomes.insert(id.to_string(), outcome);
        if let Some(FetchOutcome::Length(prev)) = previous {
            agg.total -= prev;
        }
        if let FetchOutcome::Length(n) = outcome {
            agg.total += n;
        }
    }

    /// Consistent copy of the current state. Only meant for debugging mid-run;
    /// the authoritative read is `into_snapshot` after all workers joined.
    pub fn snapshot(&self) -> AggregateSnapshot {
        let agg = self.lock();
        AggregateSnapshot {
            outcomes: agg.outcomes.clone(),
            total: agg.total,
        }
    }

    pub fn into_snapshot(self) -> AggregateSnapshot {
        let agg = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        AggregateSnapshot {
            outcomes: agg.outcomes,
            total: agg.total,
        }
    }

    // Poisoning is ignored: `record` has no panicking step between its two writes.
    fn lock(&self) -> MutexGuard<'_, Aggregate> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owned view of the aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSnapshot {
    pub outcomes: HashMap<String, FetchOutcome>,
    pub total: u64,
}

impl AggregateSnapshot {
    /// Sum of successful lengths recomputed from the map.
    pub fn successful_sum(&self) -> u64 {
        self.outcomes.values().filter_map(FetchOutcome::length).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failed()).count()
    }
}
