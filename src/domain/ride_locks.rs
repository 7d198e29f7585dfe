//! Per-ride transition serialization.
//!
//! [`RideLocks`] keeps one [`tokio::sync::Mutex`] per live ride in a
//! `HashMap` behind an outer [`tokio::sync::RwLock`]. Every state
//! transition (claim, complete, rate, cancel) locks the ride's mutex
//! around its read-validate-write cycle, so concurrent claims on the same
//! ride resolve to exactly one winner while transitions on different rides
//! stay concurrent.
//!
//! This is the single authoritative serialization point the claim race
//! requires, and it assumes a single-instance deployment: the store itself
//! only guarantees per-key atomicity.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::RideId;

/// Table of per-ride transition locks.
///
/// # Concurrency
///
/// - Transitions on different rides proceed concurrently.
/// - Transitions on the same ride are serialized.
/// - Terminal rides are evicted via [`RideLocks::discard`]; a straggler
///   still holding the old `Arc` simply re-reads the record and fails on
///   its status check.
#[derive(Debug, Default)]
pub struct RideLocks {
    locks: RwLock<HashMap<RideId, Arc<Mutex<()>>>>,
}

impl RideLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the lock for `ride_id`, creating it on first use.
    pub async fn acquire(&self, ride_id: &RideId) -> Arc<Mutex<()>> {
        {
            let map = self.locks.read().await;
            if let Some(lock) = map.get(ride_id) {
                return Arc::clone(lock);
            }
        }
        let mut map = self.locks.write().await;
        Arc::clone(
            map.entry(ride_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drops the lock entry for a ride that reached a terminal state.
    ///
    /// Keeps the table bounded by the number of live rides.
    pub async fn discard(&self, ride_id: &RideId) {
        self.locks.write().await.remove(ride_id);
    }

    /// Returns the number of rides currently holding a lock entry.
    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Returns `true` if no ride holds a lock entry.
    pub async fn is_empty(&self) -> bool {
        self.locks.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_returns_same_lock_for_same_ride() {
        let locks = RideLocks::new();
        let id = RideId::from_key("ride:1:alice");
        let a = locks.acquire(&id).await;
        let b = locks.acquire(&id).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len().await, 1);
    }

    #[tokio::test]
    async fn different_rides_get_different_locks() {
        let locks = RideLocks::new();
        let a = locks.acquire(&RideId::from_key("ride:1:alice")).await;
        let b = locks.acquire(&RideId::from_key("ride:2:bob")).await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn discard_removes_entry() {
        let locks = RideLocks::new();
        let id = RideId::from_key("ride:1:alice");
        let _lock = locks.acquire(&id).await;
        locks.discard(&id).await;
        assert!(locks.is_empty().await);
    }

    #[tokio::test]
    async fn lock_serializes_critical_sections() {
        let locks = Arc::new(RideLocks::new());
        let id = RideId::from_key("ride:1:alice");
        let counter = Arc::new(RwLock::new(0_u32));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let id = id.clone();
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let lock = locks.acquire(&id).await;
                let _held = lock.lock().await;
                // Read-then-write with an await point in between; without
                // the mutex this would lose increments.
                let current = *counter.read().await;
                tokio::task::yield_now().await;
                *counter.write().await = current + 1;
            }));
        }
        for handle in handles {
            let Ok(()) = handle.await else {
                panic!("task panicked");
            };
        }
        assert_eq!(*counter.read().await, 8);
    }
}
