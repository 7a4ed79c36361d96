//! Keyed async tasks with supersede-on-spawn semantics
//!
//! Thunks already tag their requests so stale completions can't overwrite
//! newer state. When the caller also wants superseded work to stop (the user
//! changed the year filter twice in quick succession), the thunk is spawned
//! through a [`TaskManager`] under a key: spawning again under the same key
//! aborts the previous task before it reaches the network.
//!
//! # Example
//!
//! ```ignore
//! use binaan_dispatch::tasks::{TaskKey, TaskManager};
//! use std::time::Duration;
//!
//! let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(done_tx);
//!
//! // A second spawn under "anak.refresh" aborts the first one
//! let ctx = ctx.clone();
//! tasks.spawn("anak.refresh", async move { anak::refresh(&ctx, patch).await });
//!
//! // Search-as-you-type: only runs after 300ms without a new keystroke
//! tasks.debounce("anak.search", Duration::from_millis(300), async move { .. });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Identifies a task for cancellation and replacement.
///
/// Tasks with the same key are mutually exclusive.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Manages keyed async tasks with automatic cancellation.
///
/// Each finished task sends its output, tagged with its key, to the channel
/// given at construction. Cancelled tasks send nothing.
pub struct TaskManager<T> {
    tasks: HashMap<TaskKey, AbortHandle>,
    done_tx: mpsc::UnboundedSender<(TaskKey, T)>,
}

impl<T> TaskManager<T>
where
    T: Send + 'static,
{
    pub fn new(done_tx: mpsc::UnboundedSender<(TaskKey, T)>) -> Self {
        Self {
            tasks: HashMap::new(),
            done_tx,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.spawn_after(key.into(), None, future)
    }

    /// Spawn a task that waits `duration` before running.
    ///
    /// Calling again with the same key before the delay expires cancels the
    /// pending task and restarts the timer.
    pub fn debounce<F>(
        &mut self,
        key: impl Into<TaskKey>,
        duration: Duration,
        future: F,
    ) -> &mut Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.spawn_after(key.into(), Some(duration), future)
    }

    fn spawn_after<F>(&mut self, key: TaskKey, delay: Option<Duration>, future: F) -> &mut Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        if self.cancel(&key) {
            tracing::debug!(task = %key, "superseded running task");
        }

        let tx = self.done_tx.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let output = future.await;
            // Receiver gone means nobody is interested anymore
            let _ = tx.send((task_key, output));
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Cancel a task by key. Returns whether an unfinished task was aborted.
    pub fn cancel(&mut self, key: &TaskKey) -> bool {
        match self.tasks.remove(key) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Cancel all running tasks.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Check if a task with the given key is still running.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Forget handles of tasks that already finished.
    pub fn prune(&mut self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }

    /// Number of tracked tasks (finished ones are dropped by [`prune`](Self::prune)).
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(key, _)| key)
    }
}

impl<T> Drop for TaskManager<T> {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
