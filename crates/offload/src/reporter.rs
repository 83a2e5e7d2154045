//! Failure notification
//!
//! The scheduler reports task failures through an injected collaborator
//! instead of a global logger, so hosts can route notifications wherever
//! they need (alerting, counters, test capture).

use tracing::error;

/// Receives a notification for every failed or panicked task.
pub trait ErrorReporter: Send + Sync {
    /// Called once per failed task, from the worker context.
    fn task_failed(&self, task_id: &str, error: &str);
}

/// Default reporter that emits a structured error event.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn task_failed(&self, task_id: &str, error: &str) {
        error!(%task_id, %error, "task failed");
    }
}
