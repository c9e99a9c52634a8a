//! Per-key mutual exclusion for commands.
//!
//! A command wrapped in [`KeyedLock::try_lock`] is skipped while another invocation with the
//! same key is still running. The registry only holds weak references, so a key's mutex is
//! dropped as soon as no invocation holds it and the entry is pruned on the next access.

use std::hash::Hash;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of mutexes keyed by `K`, typically a user ID.
#[derive(Clone)]
pub struct KeyedLock<K: Eq + Hash> {
    locks: Arc<DashMap<K, Weak<Mutex<()>>>>,
}

impl<K: Eq + Hash> Default for KeyedLock<K> {
    fn default() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }
}

impl<K: Eq + Hash> KeyedLock<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key` without waiting.
    ///
    /// # Returns
    /// - `Some(guard)` - The lock was free; it is held until the guard is dropped
    /// - `None` - Another holder has the lock for this key
    pub fn try_lock(&self, key: K) -> Option<OwnedMutexGuard<()>> {
        self.locks.retain(|_, lock| lock.strong_count() > 0);

        let mutex = {
            let mut entry = self.locks.entry(key).or_default();
            match entry.upgrade() {
                Some(mutex) => mutex,
                None => {
                    let mutex = Arc::new(Mutex::new(()));
                    *entry = Arc::downgrade(&mutex);
                    mutex
                }
            }
        };

        mutex.try_lock_owned().ok()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_holder_of_a_key_is_skipped() {
        let locks = KeyedLock::new();

        let guard = locks.try_lock(1_u64);

        assert!(guard.is_some());
        assert!(locks.try_lock(1).is_none());
    }

    #[test]
    fn different_keys_do_not_contend() {
        let locks = KeyedLock::new();

        let _first = locks.try_lock(1_u64).unwrap();

        assert!(locks.try_lock(2).is_some());
    }

    #[test]
    fn released_locks_can_be_taken_again() {
        let locks = KeyedLock::new();

        drop(locks.try_lock(1_u64).unwrap());

        assert!(locks.try_lock(1).is_some());
    }

    #[test]
    fn released_entries_are_pruned() {
        let locks = KeyedLock::new();

        let first = locks.try_lock(1_u64).unwrap();
        drop(locks.try_lock(2).unwrap());
        assert_eq!(locks.len(), 2);

        let _third = locks.try_lock(3).unwrap();
        assert_eq!(locks.len(), 2);

        drop(first);
        drop(locks.try_lock(4).unwrap());
        assert_eq!(locks.len(), 2);
    }
}
