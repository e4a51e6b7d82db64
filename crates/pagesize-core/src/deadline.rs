//! Run deadline: a one-shot timer that fires a shared cancellation signal.
//!
//! Firing is idempotent and visible to every clone of the token, including
//! clones taken after the fact. The timer task is aborted when the
//! `Deadline` is dropped so it never outlives the run.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RunTimeout;

pub struct Deadline {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl Deadline {
    /// Arm the timer. Must be called from within a tokio runtime.
    pub fn start(timeout: RunTimeout) -> Self {
        let token = CancellationToken::new();
        let fire = token.clone();
        let duration = timeout.duration();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            tracing::warn!(
                "execution time over ({:?}); terminating all open workers gracefully",
                duration
            );
            fire.cancel();
        });
        Self { token, timer }
    }

    /// Handle to the cancellation signal; hand one to each worker.
    pub fn signal(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn fired(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
