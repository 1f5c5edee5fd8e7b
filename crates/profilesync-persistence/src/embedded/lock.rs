// Per-row exclusive locks for the embedded backend

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Table of row locks keyed by service-profile id.
///
/// Entries are created on first acquisition and dropped again once no
/// transaction holds or waits for them.
#[derive(Default)]
pub struct RowLocks {
    rows: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the row is free and lock it.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let mutex = self.rows.entry(id).or_default().clone();
        mutex.lock_owned().await
    }

    /// Unlock the row and forget it when nobody else is waiting.
    pub fn release(&self, id: &Uuid, guard: OwnedMutexGuard<()>) {
        drop(guard);
        self.rows
            .remove_if(id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    /// Number of rows currently tracked
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let locks = RowLocks::new();
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        assert_eq!(locks.len(), 1);

        locks.release(&id, guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_second_acquire_waits_for_release() {
        let locks = Arc::new(RowLocks::new());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let guard = locks.acquire(id).await;
                locks.release(&id, guard);
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        locks.release(&id, guard);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_rows_do_not_block() {
        let locks = RowLocks::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let guard_a = locks.acquire(a).await;
        let guard_b = tokio::time::timeout(Duration::from_secs(1), locks.acquire(b))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);

        locks.release(&a, guard_a);
        locks.release(&b, guard_b);
        assert!(locks.is_empty());
    }
}
