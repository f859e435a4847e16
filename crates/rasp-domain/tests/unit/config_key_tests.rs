//! Tests for the declared key set

use rasp_domain::ConfigKey;
use std::collections::HashSet;
use std::str::FromStr;

#[test]
fn names_are_unique_and_resolvable() {
    let mut names = HashSet::new();
    for key in ConfigKey::ALL {
        assert!(names.insert(key.name()), "duplicate name {}", key);
        assert_eq!(ConfigKey::from_name(key.name()), Some(*key));
    }
    assert_eq!(ConfigKey::ALL.len(), 41);
}

#[test]
fn bootstrap_only_keys() {
    assert!(ConfigKey::RaspId.bootstrap_only());
    assert!(ConfigKey::CloudEnable.bootstrap_only());
    assert!(ConfigKey::CloudAppSecret.bootstrap_only());
    assert!(ConfigKey::HeartbeatInterval.bootstrap_only());
    assert!(!ConfigKey::BlockStatusCode.bootstrap_only());
    assert!(!ConfigKey::HttpsVerifyPeer.bootstrap_only());
}

#[test]
fn only_algorithm_config_is_not_file_sourceable() {
    let excluded: Vec<_> = ConfigKey::ALL
        .iter()
        .filter(|k| !k.file_sourceable())
        .collect();
    assert_eq!(excluded, vec![&ConfigKey::AlgorithmConfig]);
}

#[test]
fn structured_keys() {
    assert!(ConfigKey::HookWhite.is_structured());
    assert!(ConfigKey::ResponseHeaders.is_structured());
    assert!(!ConfigKey::HookWhiteAll.is_structured());
}

#[test]
fn from_str_rejects_unknown_names() {
    assert_eq!(
        ConfigKey::from_str("cpu.usage.percent").ok(),
        Some(ConfigKey::CpuUsagePercent)
    );
    assert!(ConfigKey::from_str("cpu.usage.percentage").is_err());
}

#[test]
fn external_names_are_kept_verbatim() {
    assert_eq!(ConfigKey::HttpsVerifyPeer.name(), "openrasp.ssl_verifypeer");
    assert_eq!(ConfigKey::HookWhiteAll.name(), "hook.white.ALL");
    assert_eq!(ConfigKey::ResponseHeaders.name(), "inject.custom_headers");
}
