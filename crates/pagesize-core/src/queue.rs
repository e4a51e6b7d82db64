//! Bounded task queue between the producer and the worker pool.
//!
//! Backed by `async_channel::bounded`: the producer waits when every slot is
//! full, and workers see `None` once the queue is closed and drained.

use async_channel::{Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Producer side of the queue.
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: Sender<String>,
}

/// Consumer side of the queue; cloned once per worker.
#[derive(Debug, Clone)]
pub struct TaskReceiver {
    rx: Receiver<String>,
}

/// Create a queue with `capacity` slots (at least one).
pub fn bounded(capacity: usize) -> (TaskSender, TaskReceiver) {
    let (tx, rx) = async_channel::bounded(capacity.max(1));
    (TaskSender { tx }, TaskReceiver { rx })
}

impl TaskSender {
    /// Push one identifier, waiting for a free slot. Returns false if every receiver is gone.
    pub async fn push(&self, id: String) -> bool {
        self.tx.send(id).await.is_ok()
    }

    /// Signal "no more tasks". Items already queued stay receivable.
    pub fn close(&self) {
        self.tx.close();
    }
}

impl TaskReceiver {
    /// Next identifier, or `None` once the queue is closed and empty.
    pub async fn next(&self) -> Option<String> {
        self.rx.recv().await.ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Push `targets` in order then close the queue. Stops early if `cancel` fires
/// while waiting for a slot or if no worker is left to receive.
/// Returns how many identifiers were enqueued.
pub async fn produce(targets: Vec<String>, queue: TaskSender, cancel: CancellationToken) -> usize {
    let mut pushed = 0usize;
    for id in targets {
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(pushed, "producer stopped by deadline");
                break;
            }
            sent = queue.push(id) => sent,
        };
        if !sent {
            tracing::debug!(pushed, "producer stopped: no receivers left");
            break;
        }
        pushed += 1;
    }
    queue.close();
    tracing::debug!(pushed, "producer closed task queue");
    pushed
}

/// Run `produce` as a detached task. The coordinator does not need to join it.
pub fn spawn_producer(
    targets: Vec<String>,
    queue: TaskSender,
    cancel: CancellationToken,
) -> JoinHandle<usize> {
    tokio::spawn(produce(targets, queue, cancel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn closed_and_empty_yields_none() {
        let (tx, rx) = bounded(2);
        tx.close();
        assert_eq!(rx.next().await, None);
    }

    #[tokio::test]
    async fn items_survive_close_in_fifo_order() {
        let (tx, rx) = bounded(4);
        let pushed = produce(ids(&["a", "b", "c"]), tx, CancellationToken::new()).await;
        assert_eq!(pushed, 3);
        assert_eq!(rx.next().await.as_deref(), Some("a"));
        assert_eq!(rx.next().await.as_deref(), Some("b"));
        assert_eq!(rx.next().await.as_deref(), Some("c"));
        assert_eq!(rx.next().await, None);
    }

    #[tokio::test]
    async fn producer_waits_for_free_slot() {
        let (tx, rx) = bounded(2);
        let producer = spawn_producer(ids(&["a", "b", "c", "d"]), tx, CancellationToken::new());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rx.len(), 2);
        assert!(!producer.is_finished());

        let mut seen = Vec::new();
        while let Some(id) = rx.next().await {
            seen.push(id);
        }
        assert_eq!(seen, ids(&["a", "b", "c", "d"]));
        assert_eq!(producer.await.unwrap(), 4);
    }

    #[tokio::test]
    async fn producer_stops_on_cancel_and_closes() {
        let (tx, rx) = bounded(1);
        let cancel = CancellationToken::new();
        let producer = spawn_producer(ids(&["a", "b", "c"]), tx, cancel.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        let pushed = producer.await.unwrap();
        assert_eq!(pushed, 1);
        assert_eq!(rx.next().await.as_deref(), Some("a"));
        assert_eq!(rx.next().await, None);
    }

    #[tokio::test]
    async fn producer_stops_when_receivers_dropped() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let pushed = produce(ids(&["a", "b"]), tx, CancellationToken::new()).await;
        assert_eq!(pushed, 0);
    }

    #[tokio::test]
    async fn empty_target_list_closes_immediately() {
        let (tx, rx) = bounded(2);
        let pushed = produce(Vec::new(), tx, CancellationToken::new()).await;
        assert_eq!(pushed, 0);
        assert!(rx.is_empty());
        assert_eq!(rx.next().await, None);
    }
}
