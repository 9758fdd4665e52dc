//! Process-wide cache with per-entry time-to-live.
//!
//! Expiry is checked on read: an entry past its deadline is removed and the
//! read misses. The cache is a plain component behind `get`/`set` so a
//! process-external cache could replace it without touching callers.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    inner: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TtlCache<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Returns the cached value for `key`, or `None` if absent or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut map = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`, replacing any previous entry, valid for
    /// `ttl` from now.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let mut map = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}
