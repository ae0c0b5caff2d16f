use std::future::Future;
use std::time::Duration;

use tokio::{sync::Mutex, task::JoinHandle, time};

/// Trailing-edge debouncer: each trigger replaces the pending invocation, so
/// only the last trigger within a quiet window actually runs.
///
/// The armed action runs on its own task once the delay elapses, so a
/// re-trigger cancels a *waiting* action but never one already executing,
/// and a panic inside one invocation is confined to that task.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Arm (or re-arm) the action: any invocation still waiting out its
    /// delay is aborted and the clock restarts.
    pub async fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Anchor the deadline at the trigger, not at the task's first poll.
        let deadline = time::Instant::now() + self.delay;
        let mut pending = self.pending.lock().await;
        if let Some(prev) = pending.take() {
            prev.abort();
        }
        *pending = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            // Detach before running: once fired, the action is no longer
            // cancellable by a later trigger.
            tokio::spawn(action);
        }));
    }

    /// Drop any invocation still waiting out its delay.
    pub async fn cancel(&self) {
        if let Some(prev) = self.pending.lock().await.take() {
            prev.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
