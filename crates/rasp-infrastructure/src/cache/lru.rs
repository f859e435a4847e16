//! Moka-backed dependent cache
//!
//! Implements [`DependentCache`] on top of `moka::sync::Cache`. Recreating or
//! clearing the cache swaps in a fresh instance, so readers never observe a
//! half-cleared one.
//!
//! ## Example
//!
//! ```ignore
//! use rasp_infrastructure::cache::DependentCacheManager;
//!
//! let cache = DependentCacheManager::with_capacity(1024);
//! cache.insert("select 1".to_string(), "ok".to_string());
//! ```

use arc_swap::ArcSwap;
use moka::sync::Cache;
use rasp_domain::ports::DependentCache;
use rasp_domain::value_objects::ConfigSnapshot;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Verdict cache whose capacity follows `lru.max_size`
pub struct DependentCacheManager {
    cache: ArcSwap<Cache<String, String>>,
    capacity: AtomicU64,
}

impl DependentCacheManager {
    /// Create a cache with the given capacity
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: ArcSwap::from_pointee(build(capacity)),
            capacity: AtomicU64::new(capacity),
        }
    }

    /// Approximate number of cached entries
    pub fn entry_count(&self) -> u64 {
        let cache = self.cache.load();
        cache.run_pending_tasks();
        cache.entry_count()
    }
}

impl Default for DependentCacheManager {
    fn default() -> Self {
        Self::with_capacity(u64::from(ConfigSnapshot::default().lru_max_size))
    }
}

impl DependentCache for DependentCacheManager {
    fn capacity(&self) -> u64 {
        self.capacity.load(Ordering::Acquire)
    }

    fn recreate(&self, capacity: u64) -> bool {
        if self.capacity.swap(capacity, Ordering::AcqRel) == capacity {
            return false;
        }
        self.cache.store(Arc::new(build(capacity)));
        true
    }

    fn clear(&self) {
        self.cache.store(Arc::new(build(self.capacity())));
    }

    fn get(&self, key: &str) -> Option<String> {
        self.cache.load().get(key)
    }

    fn insert(&self, key: String, value: String) {
        self.cache.load().insert(key, value);
    }
}

impl std::fmt::Debug for DependentCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependentCacheManager")
            .field("capacity", &self.capacity())
            .finish()
    }
}

fn build(capacity: u64) -> Cache<String, String> {
    Cache::builder().max_capacity(capacity).build()
}

/// Cache key for a piece of inspected content
///
/// With `lru.compare_enable` the content itself is the key, and content longer
/// than `lru.compare_limit` bytes is not cached at all. Otherwise the key is a
/// SHA-256 fingerprint.
pub fn verdict_cache_key(snapshot: &ConfigSnapshot, content: &str) -> Option<String> {
    if snapshot.lru_max_size == 0 {
        return None;
    }
    if snapshot.lru_compare_enable {
        let limit = usize::try_from(snapshot.lru_compare_limit).unwrap_or(usize::MAX);
        return (content.len() <= limit).then(|| content.to_string());
    }
    Some(hex::encode(Sha256::digest(content.as_bytes())))
}
