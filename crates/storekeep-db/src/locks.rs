//! # Keyed Locks
//!
//! In-process serialization of writes that share a key.
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store:{store_id}                    customer number allocation        │
//! │  stock:{store_id}:{inventory_id}     sales, stock adjustments          │
//! │                                                                         │
//! │  Sale A (Widget@NYC) ──► stock:NYC:Widget ──► holds ──► commit ──► drop│
//! │  Sale B (Widget@NYC) ──► stock:NYC:Widget ──► waits ────────────► runs │
//! │  Sale C (Gadget@NYC) ──► stock:NYC:Gadget ──► runs in parallel         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation takes at most one key and takes it before acquiring a
//! pool connection, so a lock holder never waits on another key.
//! Waiting is bounded: a caller queued longer than the configured wait gets
//! `DbError::Busy`, the same retryable error SQLite's busy timeout produces.
//! The database stays the source of truth: the conditional writes are
//! correct without these locks, the locks only keep SQLite from reporting
//! BUSY under same-key contention.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use crate::error::{DbError, DbResult};

/// Entries above this count trigger a sweep of idle keys.
const PRUNE_THRESHOLD: usize = 1024;

/// A table of async mutexes, one per key, created on first use.
#[derive(Debug)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
    max_wait: Duration,
}

impl KeyedLocks {
    /// `max_wait` bounds how long [`acquire`](Self::acquire) queues on a key.
    pub fn new(max_wait: Duration) -> Self {
        KeyedLocks {
            locks: DashMap::new(),
            max_wait,
        }
    }

    /// Waits for exclusive use of `key`. Released when the guard drops.
    ///
    /// ## Errors
    /// - `Busy` if the key stays held for longer than `max_wait`
    pub async fn acquire(&self, key: impl Into<String>) -> DbResult<OwnedMutexGuard<()>> {
        if self.locks.len() > PRUNE_THRESHOLD {
            self.prune();
        }

        let key = key.into();
        let lock = Arc::clone(
            self.locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        match tokio::time::timeout(self.max_wait, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!(key = %key, wait_ms = self.max_wait.as_millis() as u64, "Gave up waiting for key lock");
                Err(DbError::Busy)
            }
        }
    }

    /// Lock key for a store's customer counter.
    pub fn store_key(store_id: &str) -> String {
        format!("store:{store_id}")
    }

    /// Lock key for one inventory item's stock.
    pub fn stock_key(store_id: &str, inventory_id: &str) -> String {
        format!("stock:{store_id}:{inventory_id}")
    }

    /// Drops entries nobody holds or waits on.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new(WAIT));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(KeyedLocks::stock_key("s1", "i1")).await.unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new(WAIT);
        let _a = locks.acquire(KeyedLocks::store_key("s1")).await.unwrap();
        let b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(KeyedLocks::store_key("s2")),
        )
        .await;
        assert!(matches!(b, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_prune_keeps_held_keys() {
        let locks = KeyedLocks::new(WAIT);
        let held = locks.acquire("held").await.unwrap();
        drop(locks.acquire("released").await.unwrap());

        locks.prune();
        assert_eq!(locks.len(), 1);

        drop(held);
        locks.prune();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_held_key_times_out_as_busy() {
        let locks = KeyedLocks::new(Duration::from_millis(50));
        let _held = locks.acquire(KeyedLocks::stock_key("s1", "i1")).await.unwrap();

        let err = locks
            .acquire(KeyedLocks::stock_key("s1", "i1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Busy));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_waiter_gets_key_once_released() {
        let locks = Arc::new(KeyedLocks::new(Duration::from_secs(2)));
        let held = locks.acquire("k").await.unwrap();

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire("k").await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert!(waiter.await.unwrap().is_ok());
    }
}
