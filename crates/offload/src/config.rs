//! Scheduler configuration

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    /// Unique scheduler identifier (also names the worker thread)
    pub scheduler_id: String,

    /// Maximum number of task bodies running at once
    pub max_concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scheduler_id: format!("scheduler-{}", Uuid::now_v7()),
            max_concurrency: 5,
        }
    }
}

impl SchedulerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scheduler id
    pub fn with_scheduler_id(mut self, id: impl Into<String>) -> Self {
        self.scheduler_id = id.into();
        self
    }

    /// Set the maximum concurrency (clamped to at least 1)
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert!(config.scheduler_id.starts_with("scheduler-"));
        assert_eq!(config.max_concurrency, 5);
    }

    #[test]
    fn test_config_builder() {
        let config = SchedulerConfig::new()
            .with_scheduler_id("jobs")
            .with_max_concurrency(8);

        assert_eq!(config.scheduler_id, "jobs");
        assert_eq!(config.max_concurrency, 8);
    }

    #[test]
    fn test_max_concurrency_clamped() {
        let config = SchedulerConfig::new().with_max_concurrency(0);
        assert_eq!(config.max_concurrency, 1);
    }

    #[test]
    fn test_default_ids_are_unique() {
        let a = SchedulerConfig::default();
        let b = SchedulerConfig::default();
        assert_ne!(a.scheduler_id, b.scheduler_id);
    }
}
