//! Dependent Cache Port
//!
//! The verdict cache consulted by detection hooks. Its capacity and content
//! behavior track `lru.max_size`, `lru.compare_enable` and `lru.compare_limit`,
//! so the configuration store reshapes it from inside its setters.

/// Capacity-bound, clearable key → short string cache
///
/// Implementations must be cheap to call from hot paths and safe to share
/// across threads.
pub trait DependentCache: Send + Sync {
    /// Currently configured capacity
    fn capacity(&self) -> u64;

    /// Replace the cache with an empty one of the given capacity
    ///
    /// Returns true if the cache was recreated, false if the capacity was
    /// already `capacity` and nothing changed.
    fn recreate(&self, capacity: u64) -> bool;

    /// Drop every entry
    fn clear(&self);

    /// Look up a cached verdict
    fn get(&self, key: &str) -> Option<String>;

    /// Store a verdict
    fn insert(&self, key: String, value: String);
}
