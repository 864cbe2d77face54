//! One-shot delayed tasks with cancellation handles.
//!
//! Used for the delayed welcome message and the reconnect delay. Every task
//! hangs off a root token, so `shutdown()` cancels whatever is still pending.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Fired,
    Cancelled,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    root: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler whose tasks also stop when `parent` is cancelled.
    pub fn with_parent(parent: &CancellationToken) -> Self {
        Self {
            root: parent.child_token(),
        }
    }

    /// Run `job` once after `delay`, unless cancelled first.
    pub fn after<F>(&self, name: &'static str, delay: Duration, job: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.root.child_token();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(task = name, "scheduled task cancelled");
                    TaskOutcome::Cancelled
                }
                _ = sleep(delay) => {
                    job.await;
                    TaskOutcome::Fired
                }
            }
        });
        ScheduledTask { cancel, handle }
    }

    /// A task that does nothing but wait; awaiting it is a cancellable sleep.
    pub fn delay(&self, name: &'static str, delay: Duration) -> ScheduledTask {
        self.after(name, delay, async {})
    }

    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

#[derive(Debug)]
pub struct ScheduledTask {
    cancel: CancellationToken,
    handle: JoinHandle<TaskOutcome>,
}

impl ScheduledTask {
    /// Cancel the task if it has not fired yet.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task. A panicked or aborted job counts as cancelled.
    pub async fn wait(self) -> TaskOutcome {
        self.handle.await.unwrap_or(TaskOutcome::Cancelled)
    }
}
