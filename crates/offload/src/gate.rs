//! Concurrency admission control
//!
//! A counting gate bounds how many task bodies run at once. Admission
//! among waiting tasks is first-come-first-served.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting admission gate with a fixed capacity.
///
/// Clones share the same permit budget.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot and claim it.
    ///
    /// The returned permit releases its slot when dropped, on every exit
    /// path including panics.
    pub async fn acquire(&self) -> AdmissionPermit {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("admission gate semaphore is never closed");
        AdmissionPermit { _permit: permit }
    }

    /// Configured maximum number of concurrent holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Number of slots currently held.
    pub fn current_load(&self) -> usize {
        self.capacity.saturating_sub(self.permits.available_permits())
    }
}

/// RAII handle for one admission slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_clamped_to_one() {
        let gate = AdmissionGate::new(0);
        assert_eq!(gate.capacity(), 1);
        assert_eq!(gate.available(), 1);
    }

    #[test]
    fn test_permit_release_on_drop() {
        let gate = AdmissionGate::new(2);

        let permit = tokio_test::block_on(gate.acquire());
        assert_eq!(gate.available(), 1);
        assert_eq!(gate.current_load(), 1);

        drop(permit);
        assert_eq!(gate.available(), 2);
        assert_eq!(gate.current_load(), 0);
    }

    #[test]
    fn test_clones_share_permit_budget() {
        let gate = AdmissionGate::new(1);
        let other = gate.clone();

        let _permit = tokio_test::block_on(gate.acquire());
        assert_eq!(other.available(), 0);
        assert_eq!(other.current_load(), 1);
    }
}
