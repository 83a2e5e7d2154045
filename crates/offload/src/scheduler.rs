//! Scheduler orchestration
//!
//! The [`Scheduler`] is the producer-facing surface: it validates and
//! enqueues tasks, lazily starts the worker context, publishes results,
//! and coordinates graceful shutdown. All of its methods are callable
//! from any thread and none of them blocks on task execution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::config::SchedulerConfig;
use crate::context::{ContextPhase, Lifecycle, LifecycleInner, WorkerContext};
use crate::error::SchedulerError;
use crate::gate::AdmissionGate;
use crate::reporter::{ErrorReporter, TracingReporter};
use crate::store::ResultStore;
use crate::task::{Task, TaskOutcome};

/// Bounded background task scheduler.
///
/// Accepts async tasks from producer threads, runs them on a lazily
/// started worker context under a hard concurrency cap, and hands
/// completed outcomes back through [`fetch`](Scheduler::fetch) and
/// [`drain`](Scheduler::drain).
pub struct Scheduler {
    config: SchedulerConfig,
    gate: AdmissionGate,
    store: Arc<ResultStore>,
    reporter: Arc<dyn ErrorReporter>,
    lifecycle: Arc<Lifecycle>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    /// Create a scheduler that reports failures through [`TracingReporter`].
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_reporter(config, Arc::new(TracingReporter))
    }

    /// Create a scheduler with an injected failure reporter.
    pub fn with_reporter(config: SchedulerConfig, reporter: Arc<dyn ErrorReporter>) -> Self {
        let gate = AdmissionGate::new(config.max_concurrency);
        Self {
            config,
            gate,
            store: Arc::new(ResultStore::new()),
            reporter,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    /// Submit one task for background execution.
    ///
    /// Starts the worker context if none is live, enqueues the task, and
    /// returns without waiting for execution. Submitting a task whose id
    /// matches an unclaimed outcome overwrites that outcome once the new
    /// task finishes (last write wins).
    pub fn submit(&self, task: Task) -> Result<(), SchedulerError> {
        if task.id.is_empty() {
            return Err(SchedulerError::EmptyTaskId);
        }

        let mut inner = self.lifecycle.inner.lock();
        self.ensure_context(&mut inner)?;
        enqueue(&inner, task);
        Ok(())
    }

    /// Submit a batch of tasks under a single lifecycle check.
    ///
    /// The whole batch is rejected if any task has an empty id; an empty
    /// batch is a no-op and does not start a worker context.
    pub fn submit_many(
        &self,
        tasks: impl IntoIterator<Item = Task>,
    ) -> Result<(), SchedulerError> {
        let tasks: Vec<Task> = tasks.into_iter().collect();
        if tasks.iter().any(|task| task.id.is_empty()) {
            return Err(SchedulerError::EmptyTaskId);
        }
        if tasks.is_empty() {
            return Ok(());
        }

        let mut inner = self.lifecycle.inner.lock();
        self.ensure_context(&mut inner)?;
        for task in tasks {
            enqueue(&inner, task);
        }
        Ok(())
    }

    /// Remove and return the outcome for `id`, if it has finished.
    ///
    /// Never blocks on execution; returns `None` while the task is still
    /// pending or running, or if the outcome was already claimed.
    pub fn fetch(&self, id: &str) -> Option<TaskOutcome> {
        self.store.pop(id)
    }

    /// Remove and return up to `limit` finished outcomes (`0` means all).
    ///
    /// Never blocks on execution; returns an empty map when nothing has
    /// finished yet.
    pub fn drain(&self, limit: usize) -> HashMap<String, TaskOutcome> {
        self.store.drain(limit)
    }

    /// Gracefully shut down the worker context.
    ///
    /// Marks the context as draining, then waits for every pending and
    /// in-flight task to finish. `None` waits indefinitely; with a
    /// deadline, [`SchedulerError::ShutdownTimeout`] is returned if the
    /// drain is still in progress when it expires. A timed-out shutdown
    /// leaves tasks running; their outcomes stay retrievable and a later
    /// call can finish the wait. In-flight work is never cancelled, so a
    /// task body that never completes stalls an unbounded shutdown.
    #[instrument(skip(self), fields(scheduler_id = %self.config.scheduler_id))]
    pub fn shutdown(&self, timeout: Option<Duration>) -> Result<(), SchedulerError> {
        let mut inner = self.lifecycle.inner.lock();
        if inner.phase == ContextPhase::NotStarted {
            return Ok(());
        }

        if inner.phase == ContextPhase::Running {
            inner.phase = ContextPhase::Stopping;
            info!("draining worker context");
        }

        match timeout {
            None => {
                while inner.phase != ContextPhase::Stopped {
                    self.lifecycle.stopped.wait(&mut inner);
                }
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while inner.phase != ContextPhase::Stopped {
                    let result = self.lifecycle.stopped.wait_until(&mut inner, deadline);
                    if result.timed_out() {
                        break;
                    }
                }
                if inner.phase != ContextPhase::Stopped {
                    debug!("shutdown deadline expired with work still in flight");
                    return Err(SchedulerError::ShutdownTimeout);
                }
            }
        }

        inner.sender = None;
        let thread = inner.thread.take();
        drop(inner);

        if let Some(thread) = thread {
            let _ = thread.join();
        }
        info!("worker context shut down");
        Ok(())
    }

    /// Current lifecycle phase of the worker context.
    pub fn status(&self) -> ContextPhase {
        self.lifecycle.inner.lock().phase
    }

    /// True while the context is accepting new work without draining.
    pub fn is_running(&self) -> bool {
        self.status() == ContextPhase::Running
    }

    /// Number of admission slots currently held by running task bodies.
    pub fn current_load(&self) -> usize {
        self.gate.current_load()
    }

    /// The scheduler's id.
    pub fn scheduler_id(&self) -> &str {
        &self.config.scheduler_id
    }

    /// The scheduler's configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start a worker context if none is live. Called under the lifecycle
    /// lock so the check and the start are one atomic step.
    fn ensure_context(&self, inner: &mut LifecycleInner) -> Result<(), SchedulerError> {
        if inner.phase.is_active() {
            return Ok(());
        }

        // A previously stopped context leaves a finished thread behind;
        // reap it before installing the replacement.
        if let Some(finished) = inner.thread.take() {
            let _ = finished.join();
        }

        let (sender, thread) = WorkerContext::spawn(
            self.config.scheduler_id.clone(),
            self.gate.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.reporter),
            Arc::clone(&self.lifecycle),
        )?;

        inner.sender = Some(sender);
        inner.thread = Some(thread);
        inner.phase = ContextPhase::Running;
        debug!(scheduler_id = %self.config.scheduler_id, "worker context spawned");
        Ok(())
    }
}

/// Hand a task to the live context. Runs under the lifecycle lock; the
/// receiver cannot close before this send because the context clears the
/// sender under the same lock when it exits.
fn enqueue(inner: &LifecycleInner, task: Task) {
    debug!(task_id = %task.id, "task submitted");
    if let Some(sender) = &inner.sender {
        let _ = sender.send(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scheduler(max_concurrency: usize) -> Scheduler {
        Scheduler::new(
            SchedulerConfig::new()
                .with_scheduler_id("test-scheduler")
                .with_max_concurrency(max_concurrency),
        )
    }

    #[test]
    fn test_drain_without_submissions_spawns_nothing() {
        let scheduler = scheduler(2);

        assert!(scheduler.drain(0).is_empty());
        assert_eq!(scheduler.fetch("missing"), None);
        assert_eq!(scheduler.status(), ContextPhase::NotStarted);
    }

    #[test]
    fn test_shutdown_before_any_submission() {
        let scheduler = scheduler(2);
        assert!(scheduler.shutdown(None).is_ok());
        assert_eq!(scheduler.status(), ContextPhase::NotStarted);
    }

    #[test]
    fn test_empty_task_id_rejected() {
        let scheduler = scheduler(2);
        let result = scheduler.submit(Task::new("", async { Ok(json!(1)) }));

        assert!(matches!(result, Err(SchedulerError::EmptyTaskId)));
        assert_eq!(scheduler.status(), ContextPhase::NotStarted);
    }

    #[test]
    fn test_submit_many_rejects_batch_with_empty_id() {
        let scheduler = scheduler(2);
        let result = scheduler.submit_many(vec![
            Task::new("ok", async { Ok(json!(1)) }),
            Task::new("", async { Ok(json!(2)) }),
        ]);

        assert!(matches!(result, Err(SchedulerError::EmptyTaskId)));
        assert_eq!(scheduler.status(), ContextPhase::NotStarted);
    }

    #[test]
    fn test_submit_many_empty_batch_is_noop() {
        let scheduler = scheduler(2);
        assert!(scheduler.submit_many(Vec::new()).is_ok());
        assert_eq!(scheduler.status(), ContextPhase::NotStarted);
    }

    #[test]
    fn test_accessors() {
        let scheduler = scheduler(3);
        assert_eq!(scheduler.scheduler_id(), "test-scheduler");
        assert_eq!(scheduler.config().max_concurrency, 3);
        assert_eq!(scheduler.current_load(), 0);
        assert!(!scheduler.is_running());
    }
}
