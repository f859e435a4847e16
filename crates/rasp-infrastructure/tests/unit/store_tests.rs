//! Configuration store tests

use crate::test_utils::{raw, store, store_with_cache};
use rasp_domain::ports::DependentCache;
use rasp_domain::{CheckType, ConfigKey, ConfigSnapshot, ConfigSource, Error};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;

struct LogSink(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_empty_document_yields_defaults() {
    let store = store();
    let report = store.load_from_file(Some(&raw(json!({}))), true);

    let mut expected = ConfigSnapshot::default();
    expected.generation = 1;
    assert_eq!(*store.snapshot(), expected);
    assert_eq!(report.source, ConfigSource::File);
    assert_eq!(report.generation, 1);
    assert!(report.rejected.is_empty());
}

#[test]
fn test_missing_document_yields_defaults() {
    let store = store();
    store.load_from_file(Some(&raw(json!({"block.status_code": 403}))), true);
    store.load_from_file(None, false);
    assert_eq!(store.snapshot().block_status_code, 302);
}

#[test]
fn test_document_values_are_converted() {
    let store = store();
    let report = store.load_from_file(
        Some(&raw(json!({
            "plugin.timeout.millis": 250,
            "hooks.ignore": " sql, command ,",
            "inject.urlprefix": "http://example.com/app//",
            "block.status_code": "403",
            "block.redirect_url": "",
            "log.maxbackup": 5,
            "debug.level": -3,
            "plugin.filter": "TRUE",
            "decompile.enable": "yes",
            "syslog.facility": 23
        }))),
        true,
    );
    assert!(report.rejected.is_empty());

    let s = store.snapshot();
    assert_eq!(s.plugin_timeout_millis, 250);
    assert_eq!(s.hooks_ignore, vec!["sql", "command"]);
    assert_eq!(s.inject_url_prefix, "http://example.com/app");
    assert_eq!(s.block_status_code, 403);
    assert_eq!(s.block_redirect_url, ConfigKey::BlockRedirectUrl.default_value());
    assert_eq!(s.log_max_backup, 6);
    assert_eq!(s.debug_level, 0);
    assert!(s.plugin_filter);
    assert!(!s.decompile_enable);
    assert_eq!(s.syslog_facility, 23);
}

#[test]
fn test_cpu_percent_below_range_is_rejected() {
    let store = store();
    store.load_from_file(Some(&raw(json!({"cpu.usage.percent": 50}))), true);

    let report = store.load_from_file(Some(&raw(json!({"cpu.usage.percent": "15"}))), false);
    assert_eq!(report.rejected, vec![ConfigKey::CpuUsagePercent]);
    // File source keeps the previous value
    assert_eq!(store.snapshot().cpu_usage_percent, 50);

    assert!(!store.set_config("cpu.usage.percent", "15", false));
    assert_eq!(store.snapshot().cpu_usage_percent, 50);
}

#[test]
fn test_heartbeat_interval_below_range_is_rejected() {
    let store = store();
    store.load_from_file(Some(&raw(json!({"cloud.heartbeat_interval": 30}))), true);
    let report =
        store.load_from_file(Some(&raw(json!({"cloud.heartbeat_interval": "5"}))), false);
    assert_eq!(report.rejected, vec![ConfigKey::HeartbeatInterval]);
    assert_eq!(store.snapshot().heartbeat_interval, 30);
}

#[test]
fn test_range_boundaries() {
    let store = store();
    assert!(store.set_config("block.status_code", "100", false));
    assert!(store.set_config("block.status_code", "999", false));
    assert!(!store.set_config("block.status_code", "1000", false));
    assert!(!store.set_config("block.status_code", "99", false));
    assert!(store.set_config("cpu.usage.percent", "30", false));
    assert!(!store.set_config("cpu.usage.percent", "101", false));
    assert!(store.set_config("syslog.facility", "0", false));
    assert!(!store.set_config("syslog.facility", "24", false));
    assert!(!store.set_config("plugin.timeout.millis", "0", false));
    assert!(!store.set_config("body.maxbytes", "abc", false));
    assert_eq!(store.snapshot().block_status_code, 999);
}

#[test]
fn test_cloud_rejection_falls_back_to_default() {
    let store = store();
    store.load_from_cloud(&raw(json!({"cpu.usage.percent": 50})));
    assert_eq!(store.snapshot().cpu_usage_percent, 50);

    let report = store.load_from_cloud(&raw(json!({"cpu.usage.percent": 15})));
    assert_eq!(report.source, ConfigSource::Cloud);
    assert_eq!(report.rejected, vec![ConfigKey::CpuUsagePercent]);
    assert_eq!(store.snapshot().cpu_usage_percent, 90);
}

#[test]
fn test_cloud_skips_bootstrap_only_keys() {
    let store = store();
    store.load_from_file(
        Some(&raw(json!({
            "rasp.id": "abcdefghij0123456789",
            "cloud.heartbeat_interval": 60
        }))),
        true,
    );
    store.load_from_cloud(&raw(json!({
        "rasp.id": "zzzzzzzzzzzzzzzzzzzz",
        "cloud.enable": true,
        "cloud.app_secret": "stolen",
        "cloud.heartbeat_interval": 10,
        "block.status_code": 500
    })));

    let s = store.snapshot();
    assert_eq!(s.rasp_id, "abcdefghij0123456789");
    assert!(!s.cloud_enable);
    assert_eq!(s.cloud_app_secret, "");
    assert_eq!(s.heartbeat_interval, 60);
    assert_eq!(s.block_status_code, 500);
}

#[test]
fn test_cloud_resets_missing_keys_to_defaults() {
    let store = store();
    store.load_from_cloud(&raw(json!({"block.status_code": 500, "syslog.tag": "X"})));
    store.load_from_cloud(&raw(json!({"syslog.tag": "X"})));
    let s = store.snapshot();
    assert_eq!(s.block_status_code, 302);
    assert_eq!(s.syslog_tag, "X");
}

#[test]
fn test_cloud_rejects_structures_for_scalar_keys() {
    let store = store();
    let report = store.load_from_cloud(&raw(json!({"block.status_code": [403]})));
    assert_eq!(report.rejected, vec![ConfigKey::BlockStatusCode]);
    assert_eq!(store.snapshot().block_status_code, 302);
}

#[test]
fn test_unknown_keys() {
    let store = store();
    assert!(!store.set_config("no.such.key", "1", false));

    let report = store.load_from_cloud(&raw(json!({"no.such.key": 1, "debug.level": 2})));
    assert_eq!(report.unknown, vec!["no.such.key".to_string()]);
    assert_eq!(store.snapshot().debug_level, 2);
}

#[test]
fn test_runtime_refuses_bootstrap_only_keys() {
    let store = store();
    assert!(!store.set_config("cloud.enable", "true", false));
    assert!(!store.set_config("rasp.id", "abcdefghij0123456789", true));
    assert!(!store.snapshot().cloud_enable);
}

#[test]
fn test_whitelist_from_document() {
    let store = store();
    store.load_from_file(
        Some(&raw(json!({"hook.white": {"*": ["all"], "sql": ["sqli"]}}))),
        true,
    );
    let whitelist = store.snapshot().hook_whitelist.clone();
    assert_eq!(whitelist.len(), 1);
    assert_eq!(whitelist.mask(""), Some(CheckType::all_mask()));

    store.load_from_file(Some(&raw(json!({"hook.white": {"sql": ["sqli"]}}))), false);
    let whitelist = store.snapshot().hook_whitelist.clone();
    assert_eq!(whitelist.len(), 1);
    assert_eq!(whitelist.mask("sql"), Some(CheckType::Sqli.code()));

    // Absent section empties the whitelist
    store.load_from_file(Some(&raw(json!({}))), false);
    assert!(store.snapshot().hook_whitelist.is_empty());
}

#[test]
fn test_oversized_header_rejects_whole_set() {
    let store = store();
    store.load_from_file(
        Some(&raw(json!({"inject.custom_headers": {"X-Protected-By": "OpenRASP"}}))),
        true,
    );
    let report = store.load_from_file(
        Some(&raw(json!({"inject.custom_headers": {
            "X-Ok": "fine",
            "X-Long": "v".repeat(201)
        }}))),
        false,
    );
    assert_eq!(report.rejected, vec![ConfigKey::ResponseHeaders]);

    let headers = store.snapshot().response_headers.clone();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get("X-Protected-By"), Some("OpenRASP"));
}

#[test]
fn test_cloud_header_rejection_keeps_previous_set() {
    let store = store();
    store.load_from_cloud(&raw(json!({"inject.custom_headers": {"X-Protected-By": "OpenRASP"}})));
    let report = store.load_from_cloud(&raw(json!({"inject.custom_headers": {
        "X-Long": "v".repeat(201)
    }})));
    assert_eq!(report.rejected, vec![ConfigKey::ResponseHeaders]);
    assert!(!report.changed.contains(&ConfigKey::ResponseHeaders));

    let headers = store.snapshot().response_headers.clone();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get("X-Protected-By"), Some("OpenRASP"));

    // Absent from the map still means the default, empty set
    store.load_from_cloud(&raw(json!({"block.status_code": 403})));
    assert!(store.snapshot().response_headers.is_empty());
}

#[test]
fn test_unchanged_keys_are_logged() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || LogSink(Arc::clone(&sink)))
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let store = store();
        let doc = raw(json!({"block.status_code": 403}));
        store.load_from_file(Some(&doc), true);
        store.load_from_file(Some(&doc), false);
        store.load_from_cloud(&doc);
        store.load_from_cloud(&doc);
        assert!(store.set_config("block.status_code", "403", false));
    });

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    let unchanged: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("configuration item \"block.status_code\" unchanged"))
        .collect();
    assert_eq!(unchanged.len(), 4, "{}", output);
    assert!(unchanged.iter().any(|line| line.contains("source=file")));
    assert!(unchanged.iter().any(|line| line.contains("source=cloud")));
    assert!(unchanged.iter().any(|line| line.contains("source=runtime")));
}

#[test]
fn test_headers_must_be_a_mapping() {
    let store = store();
    let report =
        store.load_from_file(Some(&raw(json!({"inject.custom_headers": "X-A: b"}))), true);
    assert_eq!(report.rejected, vec![ConfigKey::ResponseHeaders]);
    assert!(store.snapshot().response_headers.is_empty());
}

#[test]
fn test_runtime_headers_accept_json_text() {
    let store = store();
    assert!(store.set_config("inject.custom_headers", r#"{"X-A": "b"}"#, false));
    assert_eq!(store.snapshot().response_headers.get("X-A"), Some("b"));
    assert!(!store.set_config("inject.custom_headers", "[1]", false));
    assert_eq!(store.snapshot().response_headers.len(), 1);
}

#[test]
fn test_capacity_change_recreates_cache() {
    let (store, cache) = store_with_cache();
    cache.insert("k".to_string(), "v".to_string());

    store.load_from_file(Some(&raw(json!({"lru.max_size": 1024}))), true);
    assert_eq!(cache.capacity(), 1024);
    assert_eq!(cache.get("k").as_deref(), Some("v"));

    store.load_from_file(Some(&raw(json!({"lru.max_size": 2048}))), false);
    assert_eq!(cache.capacity(), 2048);
    assert_eq!(cache.get("k"), None);
    assert_eq!(store.snapshot().lru_max_size, 2048);
}

#[test]
fn test_compare_settings_clear_cache() {
    let (store, cache) = store_with_cache();

    cache.insert("k".to_string(), "v".to_string());
    assert!(store.set_config("lru.compare_enable", "true", false));
    assert_eq!(cache.get("k"), None);

    cache.insert("k".to_string(), "v".to_string());
    assert!(store.set_config("lru.compare_enable", "true", false));
    assert_eq!(cache.get("k").as_deref(), Some("v"));

    // Growing the limit keeps entries, shrinking drops them
    assert!(store.set_config("lru.compare_limit", "20000", false));
    assert_eq!(cache.get("k").as_deref(), Some("v"));
    assert!(store.set_config("lru.compare_limit", "100", false));
    assert_eq!(cache.get("k"), None);

    assert!(!store.set_config("lru.compare_limit", "0", false));
    assert!(!store.set_config("lru.compare_limit", "102401", false));
    assert!(store.set_config("lru.compare_limit", "102400", false));
}

#[test]
fn test_rasp_id_validation_at_boot() {
    let store = store();
    store.load_from_file(Some(&raw(json!({"rasp.id": "abcdefghij"}))), true);
    let err = store.check_major_config().unwrap_err();
    assert!(matches!(err, Error::CriticalBoot { .. }));
    assert!(err.is_fatal());

    let store = crate::test_utils::store();
    store.load_from_file(Some(&raw(json!({"rasp.id": "abcdefghij0123456789"}))), true);
    assert!(store.check_major_config().is_ok());

    let store = crate::test_utils::store();
    store.load_from_file(Some(&raw(json!({"rasp.id": "abcdefghij-123456789"}))), true);
    assert!(store.check_major_config().is_err());

    let store = crate::test_utils::store();
    store.load_from_file(Some(&raw(json!({}))), true);
    assert!(store.check_major_config().is_ok());
}

#[test]
fn test_rasp_id_is_immutable_after_boot() {
    let store = store();
    store.load_from_file(Some(&raw(json!({"rasp.id": "abcdefghij0123456789"}))), true);
    let report = store.load_from_file(
        Some(&raw(json!({"rasp.id": "0123456789abcdefghij"}))),
        false,
    );
    assert_eq!(report.rejected, vec![ConfigKey::RaspId]);
    assert_eq!(store.snapshot().rasp_id, "abcdefghij0123456789");

    // Re-reading the same id is not a change
    let report = store.load_from_file(
        Some(&raw(json!({"rasp.id": "abcdefghij0123456789"}))),
        false,
    );
    assert!(report.rejected.is_empty());
}

#[test]
fn test_algorithm_config_from_cloud_only() {
    let store = store();
    let algorithm = json!({
        "sql_exception": {"mysql": {"error_code": [1045, "x", 1062]}}
    });

    store.load_from_file(Some(&raw(json!({"algorithm.config": algorithm.clone()}))), true);
    assert!(store.snapshot().sql_error_codes.is_empty());

    let report = store.load_from_cloud(&raw(json!({"algorithm.config": algorithm})));
    assert!(report.rejected.is_empty());
    let codes: Vec<i64> = store.snapshot().sql_error_codes.iter().copied().collect();
    assert_eq!(codes, vec![1045, 1062]);
}

#[test]
fn test_algorithm_config_must_be_an_object() {
    let store = store();
    assert!(!store.set_config("algorithm.config", "[1, 2]", false));
    assert!(!store.set_config("algorithm.config", "{broken", false));
    assert!(store.set_config("algorithm.config", r#"{"a": 1}"#, false));
    assert_eq!(store.snapshot().algorithm_config, json!({"a": 1}));
}

#[test]
fn test_generation_counts_published_writes() {
    let store = store();
    assert_eq!(store.snapshot().generation, 0);
    store.load_from_file(None, true);
    store.load_from_cloud(&raw(json!({})));
    assert!(store.set_config("debug.level", "1", false));
    assert_eq!(store.snapshot().generation, 3);

    // A rejected runtime write publishes nothing
    assert!(!store.set_config("debug.level", "x", false));
    assert_eq!(store.snapshot().generation, 3);
}

#[test]
fn test_readers_keep_their_snapshot() {
    let store = store();
    let before = store.snapshot();
    assert!(store.set_config("block.status_code", "403", false));
    assert_eq!(before.block_status_code, 302);
    assert_eq!(store.load().block_status_code, 403);
}

#[test]
fn test_report_lists_changed_keys() {
    let store = store();
    store.load_from_file(None, true);
    let report = store.load_from_file(
        Some(&raw(json!({"block.status_code": 403, "syslog.tag": "OPENRASP"}))),
        false,
    );
    assert_eq!(report.changed, vec![ConfigKey::BlockStatusCode]);
}

#[test]
fn test_secret_change_is_detected() {
    let store = store();
    store.load_from_file(Some(&raw(json!({"cloud.app_secret": "a"}))), true);
    let report = store.load_from_file(Some(&raw(json!({"cloud.app_secret": "b"}))), false);
    assert_eq!(report.changed, vec![ConfigKey::CloudAppSecret]);
    assert_eq!(store.snapshot().cloud_app_secret, "b");
}
