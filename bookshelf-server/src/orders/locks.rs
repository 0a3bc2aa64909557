//! Per-key async locks
//!
//! Placements serialize per customer and per product. Locks are created on
//! first use and pruned once nobody holds or waits on them.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub struct KeyedLocks<K> {
    slots: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    fn slot(&self, key: &K) -> Arc<Mutex<()>> {
        self.slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        self.slot(key).lock_owned().await
    }

    /// Lock every key in ascending order, duplicates collapsed
    pub async fn lock_many(&self, keys: impl IntoIterator<Item = K>) -> Vec<OwnedMutexGuard<()>>
    where
        K: Ord,
    {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Drop slots nobody holds or waits on; returns how many were removed
    pub fn prune_idle(&self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        before - self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Lock tables shared by the reconciler and the services writing the same records.
///
/// Ordering: customer lock first, then product locks ascending.
#[derive(Default)]
pub struct OrderLocks {
    pub customers: KeyedLocks<String>,
    pub products: KeyedLocks<i64>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune_idle(&self) -> usize {
        self.customers.prune_idle() + self.products.prune_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::<i64>::new());
        let guard = locks.lock(&1).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(&1).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::<i64>::new();
        let _a = locks.lock(&1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(&2)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn lock_many_dedups_keys() {
        let locks = KeyedLocks::<i64>::new();
        let guards = locks.lock_many(vec![3, 1, 3, 2]).await;
        assert_eq!(guards.len(), 3);
    }

    #[tokio::test]
    async fn prune_keeps_held_slots() {
        let locks = OrderLocks::new();
        let held = locks.customers.lock(&"a@example.com".to_string()).await;
        drop(locks.customers.lock(&"b@example.com".to_string()).await);
        drop(locks.products.lock(&7).await);

        assert_eq!(locks.prune_idle(), 2);
        assert_eq!(locks.customers.len(), 1);
        assert!(locks.products.is_empty());

        drop(held);
        assert_eq!(locks.prune_idle(), 1);
    }
}
