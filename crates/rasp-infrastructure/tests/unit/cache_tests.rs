//! Verdict cache tests

use rasp_domain::ConfigSnapshot;
use rasp_domain::ports::DependentCache;
use rasp_infrastructure::cache::{DependentCacheManager, verdict_cache_key};

#[test]
fn test_recreate_only_on_capacity_change() {
    let cache = DependentCacheManager::with_capacity(1024);
    cache.insert("a".to_string(), "block".to_string());

    assert!(!cache.recreate(1024));
    assert_eq!(cache.get("a").as_deref(), Some("block"));

    assert!(cache.recreate(2048));
    assert_eq!(cache.capacity(), 2048);
    assert_eq!(cache.get("a"), None);
}

#[test]
fn test_clear_keeps_capacity() {
    let cache = DependentCacheManager::with_capacity(16);
    cache.insert("a".to_string(), "ok".to_string());
    cache.insert("b".to_string(), "ok".to_string());
    assert_eq!(cache.entry_count(), 2);

    cache.clear();
    assert_eq!(cache.entry_count(), 0);
    assert_eq!(cache.capacity(), 16);
}

#[test]
fn test_default_capacity_follows_key_default() {
    let cache = DependentCacheManager::default();
    assert_eq!(cache.capacity(), 1024);
}

#[test]
fn test_fingerprint_key() {
    let snapshot = ConfigSnapshot::default();
    let key = verdict_cache_key(&snapshot, "select * from users").unwrap();
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(
        verdict_cache_key(&snapshot, "select * from users"),
        Some(key)
    );
}

#[test]
fn test_compare_mode_uses_content_within_limit() {
    let snapshot = ConfigSnapshot {
        lru_compare_enable: true,
        lru_compare_limit: 8,
        ..ConfigSnapshot::default()
    };
    assert_eq!(
        verdict_cache_key(&snapshot, "select 1").as_deref(),
        Some("select 1")
    );
    assert_eq!(verdict_cache_key(&snapshot, "select 10"), None);
}

#[test]
fn test_zero_capacity_disables_caching() {
    let snapshot = ConfigSnapshot {
        lru_max_size: 0,
        ..ConfigSnapshot::default()
    };
    assert_eq!(verdict_cache_key(&snapshot, "x"), None);
}
