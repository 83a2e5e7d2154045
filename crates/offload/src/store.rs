//! In-memory result storage
//!
//! Completed outcomes are held in a mutex-guarded map until a consumer
//! claims them. Every operation is bounded-time and never suspends, so
//! producer threads can call into the store without an async context.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::task::TaskOutcome;

/// Thread-safe map from task id to completed outcome.
///
/// Retrieval is destructive: `pop` and `drain` remove what they return,
/// so each outcome is observed exactly once.
#[derive(Debug, Default)]
pub struct ResultStore {
    entries: Mutex<HashMap<String, TaskOutcome>>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome, overwriting any unclaimed outcome for the same id.
    pub fn put(&self, id: String, outcome: TaskOutcome) {
        self.entries.lock().insert(id, outcome);
    }

    /// Remove and return the outcome for `id`, if one is ready.
    pub fn pop(&self, id: &str) -> Option<TaskOutcome> {
        self.entries.lock().remove(id)
    }

    /// Remove and return up to `limit` outcomes (`0` means all available).
    pub fn drain(&self, limit: usize) -> HashMap<String, TaskOutcome> {
        let mut entries = self.entries.lock();
        if limit == 0 || limit >= entries.len() {
            return std::mem::take(&mut *entries);
        }
        let ids: Vec<String> = entries.keys().take(limit).cloned().collect();
        ids.into_iter()
            .filter_map(|id| entries.remove(&id).map(|outcome| (id, outcome)))
            .collect()
    }

    /// Number of unclaimed outcomes.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if no outcomes are waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
