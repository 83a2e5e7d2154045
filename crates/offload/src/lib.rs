//! # Bounded Background Task Scheduler
//!
//! An in-process scheduler that runs async tasks in the background with a hard concurrency cap.
//!
//! ## Features
//!
//! - **Fire-and-forget submission**: Producer threads enqueue tasks and return immediately
//! - **Bounded concurrency**: At most `max_concurrency` task bodies run at once
//! - **Lazy worker lifecycle**: The worker thread starts on first submission and collapses when idle
//! - **Non-blocking retrieval**: Completed outcomes are claimed with `fetch` and `drain`, even mid-flight
//! - **Failure isolation**: A failing or panicking task becomes a recorded outcome, never a crashed worker
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Scheduler                              │
//! │  (validates tasks, lazy-starts the worker, owns lifecycle)  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ submission channel
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WorkerContext                            │
//! │  (dedicated thread, cooperative runtime, AdmissionGate)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ completed outcomes
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ResultStore                             │
//! │  (id -> outcome map, destructive fetch / drain)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use offload::{Scheduler, SchedulerConfig, Task, TaskOutcome};
//! use serde_json::json;
//!
//! let scheduler = Scheduler::new(SchedulerConfig::new().with_max_concurrency(2));
//!
//! scheduler.submit(Task::new("report", async { Ok(json!({"rows": 128})) }))?;
//! scheduler.shutdown(None)?;
//!
//! assert_eq!(
//!     scheduler.fetch("report"),
//!     Some(TaskOutcome::Completed(json!({"rows": 128})))
//! );
//! # Ok::<(), offload::SchedulerError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod reporter;
pub mod scheduler;
pub mod store;
pub mod task;

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::SchedulerConfig;
    pub use crate::context::ContextPhase;
    pub use crate::error::SchedulerError;
    pub use crate::gate::{AdmissionGate, AdmissionPermit};
    pub use crate::reporter::{ErrorReporter, TracingReporter};
    pub use crate::scheduler::Scheduler;
    pub use crate::store::ResultStore;
    pub use crate::task::{Task, TaskFuture, TaskOutcome, TaskResult};
}

// Re-export key types at crate root
pub use config::SchedulerConfig;
pub use context::ContextPhase;
pub use error::SchedulerError;
pub use gate::{AdmissionGate, AdmissionPermit};
pub use reporter::{ErrorReporter, TracingReporter};
pub use scheduler::Scheduler;
pub use store::ResultStore;
pub use task::{Task, TaskFuture, TaskOutcome, TaskResult};
