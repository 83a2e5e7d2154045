//! Task model
//!
//! A [`Task`] pairs a caller-chosen id with a boxed async operation. The
//! operation captures all of its inputs at construction time, so the
//! scheduler never needs to know about argument shapes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Result type produced by a task body.
///
/// Success carries an arbitrary JSON value; failure carries the error text.
pub type TaskResult = Result<serde_json::Value, String>;

/// Boxed future executed by the worker context.
pub type TaskFuture = Pin<Box<dyn Future<Output = TaskResult> + Send>>;

/// One unit of deferred work.
///
/// Ids are a caller-owned namespace: submitting a second task with an id
/// whose outcome is still unclaimed overwrites the stored outcome
/// (last write wins).
pub struct Task {
    pub(crate) id: String,
    pub(crate) operation: TaskFuture,
}

impl Task {
    /// Create a task from an id and an already-built future.
    pub fn new<F>(id: impl Into<String>, operation: F) -> Self
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        Self {
            id: id.into(),
            operation: Box::pin(operation),
        }
    }

    /// Create a task from a closure, deferring capture until construction.
    pub fn from_fn<F, Fut>(id: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self::new(id, f())
    }

    /// The task's id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Stored outcome of a finished task.
///
/// Failures (an `Err` from the body, or a panic) are recorded as the
/// [`Failed`](TaskOutcome::Failed) sentinel rather than surfaced as errors;
/// retrieval never raises on behalf of a task body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The task body returned a value.
    Completed(serde_json::Value),
    /// The task body returned an error or panicked.
    Failed(String),
}

impl TaskOutcome {
    /// True if the task finished successfully.
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    /// True if the task failed or panicked.
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_id_accessor() {
        let task = Task::new("report-42", async { Ok(json!(42)) });
        assert_eq!(task.id(), "report-42");
    }

    #[test]
    fn test_from_fn_defers_capture() {
        let base = 40;
        let task = Task::from_fn("sum", move || async move { Ok(json!(base + 2)) });
        let result = tokio_test::block_on(task.operation);
        assert_eq!(result, Ok(json!(42)));
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(TaskOutcome::Completed(json!(null)).is_completed());
        assert!(!TaskOutcome::Completed(json!(null)).is_failed());
        assert!(TaskOutcome::Failed("boom".into()).is_failed());
        assert!(!TaskOutcome::Failed("boom".into()).is_completed());
    }

    #[test]
    fn test_failed_is_distinct_from_null_completion() {
        assert_ne!(
            TaskOutcome::Completed(json!(null)),
            TaskOutcome::Failed(String::new())
        );
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let completed = serde_json::to_value(TaskOutcome::Completed(json!(7))).unwrap();
        assert_eq!(completed, json!({"status": "completed", "value": 7}));

        let failed = serde_json::to_value(TaskOutcome::Failed("boom".into())).unwrap();
        assert_eq!(failed, json!({"status": "failed", "value": "boom"}));
    }
}
