//! Scheduler errors
//!
//! Task-body failures are never surfaced here; they become
//! [`TaskOutcome::Failed`](crate::task::TaskOutcome::Failed) sentinels.
//! These errors cover contract violations and lifecycle failures only.

/// Errors returned by the scheduler API.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A submitted task had an empty id.
    #[error("task id must be non-empty")]
    EmptyTaskId,

    /// Graceful shutdown did not finish within the given deadline.
    ///
    /// In-flight tasks keep running and their outcomes remain
    /// retrievable; the scheduler stays usable.
    #[error("graceful shutdown timed out")]
    ShutdownTimeout,

    /// The worker thread or its runtime could not be created.
    #[error("failed to spawn worker context: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
