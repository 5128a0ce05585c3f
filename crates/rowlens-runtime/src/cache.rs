//! Expiring key-value cache.
//!
//! Entries are computed lazily by the caller and dropped once older than the
//! cache's TTL. Two callers missing at the same time both recompute; the last
//! insert wins.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Thread-safe cache with a single TTL for all entries.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The cached value, unless missing or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            let ttl = self.ttl;
            self.entries.remove_if(key, |_, entry| entry.is_expired(ttl));
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
