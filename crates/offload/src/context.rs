//! Worker context
//!
//! A worker context is one dedicated OS thread hosting a single-threaded
//! cooperative runtime. Task bodies are multiplexed on that thread under
//! the admission gate; producer threads only ever touch the submission
//! channel and short-lived locks.
//!
//! Contexts are created lazily on first submission and tear themselves
//! down once nothing is pending or in flight. A context is never reused
//! across a stop; a later submission builds a fresh one.

use std::any::Any;
use std::sync::Arc;
use std::thread;

use futures::FutureExt;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::gate::AdmissionGate;
use crate::reporter::ErrorReporter;
use crate::store::ResultStore;
use crate::task::{Task, TaskOutcome};

/// Lifecycle phase of a worker context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPhase {
    /// No context has been created yet.
    NotStarted,
    /// The context is accepting and executing tasks.
    Running,
    /// Shutdown was requested; the context drains remaining work.
    Stopping,
    /// The context has exited; a new submission starts a fresh one.
    Stopped,
}

impl ContextPhase {
    /// True while a live context can still pick up submissions.
    pub fn is_active(self) -> bool {
        matches!(self, ContextPhase::Running | ContextPhase::Stopping)
    }
}

/// Shared lifecycle state guarded by a single lock.
///
/// Holding `inner` makes phase checks atomic with channel sends, which is
/// what keeps a submission from landing in a context that has already
/// decided to stop.
pub(crate) struct Lifecycle {
    pub(crate) inner: Mutex<LifecycleInner>,
    pub(crate) stopped: Condvar,
}

pub(crate) struct LifecycleInner {
    pub(crate) phase: ContextPhase,
    pub(crate) sender: Option<mpsc::UnboundedSender<Task>>,
    pub(crate) thread: Option<thread::JoinHandle<()>>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(LifecycleInner {
                phase: ContextPhase::NotStarted,
                sender: None,
                thread: None,
            }),
            stopped: Condvar::new(),
        }
    }
}

/// The scheduling loop state moved onto the worker thread.
pub(crate) struct WorkerContext {
    scheduler_id: String,
    receiver: mpsc::UnboundedReceiver<Task>,
    gate: AdmissionGate,
    store: Arc<ResultStore>,
    reporter: Arc<dyn ErrorReporter>,
    lifecycle: Arc<Lifecycle>,
}

impl WorkerContext {
    /// Build a fresh context and start its thread.
    ///
    /// Returns the submission channel and the thread handle; the caller
    /// installs both into the lifecycle state under its lock.
    pub(crate) fn spawn(
        scheduler_id: String,
        gate: AdmissionGate,
        store: Arc<ResultStore>,
        reporter: Arc<dyn ErrorReporter>,
        lifecycle: Arc<Lifecycle>,
    ) -> std::io::Result<(mpsc::UnboundedSender<Task>, thread::JoinHandle<()>)> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let context = WorkerContext {
            scheduler_id: scheduler_id.clone(),
            receiver,
            gate,
            store,
            reporter,
            lifecycle,
        };

        let thread = thread::Builder::new()
            .name(format!("{scheduler_id}-worker"))
            .spawn(move || runtime.block_on(context.run()))?;

        Ok((sender, thread))
    }

    /// The scheduling loop.
    ///
    /// Suspends between events; the only busy path is the idle check,
    /// which runs once per drain and decides between picking up a late
    /// submission and exiting.
    async fn run(self) {
        let WorkerContext {
            scheduler_id,
            mut receiver,
            gate,
            store,
            reporter,
            lifecycle,
        } = self;

        info!(
            %scheduler_id,
            max_concurrency = gate.capacity(),
            "worker context started"
        );

        let mut in_flight: JoinSet<String> = JoinSet::new();
        let mut channel_open = true;

        loop {
            if in_flight.is_empty() {
                if !channel_open {
                    mark_stopped(&lifecycle);
                    break;
                }

                // The idle decision must be atomic with submissions:
                // under the lifecycle lock, either a pending task exists
                // and we take it, or none does and we exit before any
                // new send can target this context.
                let mut inner = lifecycle.inner.lock();
                match receiver.try_recv() {
                    Ok(task) => {
                        drop(inner);
                        admit(&mut in_flight, task, &gate, &store, &reporter);
                        continue;
                    }
                    Err(_) => {
                        inner.phase = ContextPhase::Stopped;
                        inner.sender = None;
                        lifecycle.stopped.notify_all();
                        drop(inner);
                        debug!(%scheduler_id, "worker context idle, exiting");
                        break;
                    }
                }
            }

            tokio::select! {
                received = receiver.recv(), if channel_open => match received {
                    Some(task) => admit(&mut in_flight, task, &gate, &store, &reporter),
                    None => channel_open = false,
                },
                Some(joined) = in_flight.join_next() => match joined {
                    Ok(task_id) => debug!(%task_id, "task settled"),
                    Err(join_error) => {
                        error!(error = %join_error, "task execution handle failed");
                    }
                },
            }
        }

        info!(%scheduler_id, "worker context stopped");
    }
}

/// Spawn one task body onto the cooperative runtime, gated and isolated.
fn admit(
    in_flight: &mut JoinSet<String>,
    task: Task,
    gate: &AdmissionGate,
    store: &Arc<ResultStore>,
    reporter: &Arc<dyn ErrorReporter>,
) {
    let Task { id, operation } = task;
    let gate = gate.clone();
    let store = Arc::clone(store);
    let reporter = Arc::clone(reporter);

    in_flight.spawn(async move {
        let _permit = gate.acquire().await;
        debug!(task_id = %id, "task admitted");

        let outcome = match std::panic::AssertUnwindSafe(operation).catch_unwind().await {
            Ok(Ok(value)) => TaskOutcome::Completed(value),
            Ok(Err(message)) => {
                reporter.task_failed(&id, &message);
                TaskOutcome::Failed(message)
            }
            Err(panic) => {
                let message = panic_message(panic);
                reporter.task_failed(&id, &message);
                TaskOutcome::Failed(message)
            }
        };

        store.put(id.clone(), outcome);
        id
    });
}

fn mark_stopped(lifecycle: &Lifecycle) {
    let mut inner = lifecycle.inner.lock();
    inner.phase = ContextPhase::Stopped;
    inner.sender = None;
    lifecycle.stopped.notify_all();
}

/// Extract a readable message from a panic payload.
fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("task panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("task panicked: {message}")
    } else {
        "task panicked".to_string()
    }
}
