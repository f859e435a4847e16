//! Verdict cache
//!
//! The in-memory cache shaped by the `lru.*` keys, and the key derivation
//! hooks use to look verdicts up.

pub mod lru;

pub use lru::{DependentCacheManager, verdict_cache_key};
