//! The published set of typed configuration values
//!
//! Hot-path readers hold an `Arc<ConfigSnapshot>` and read plain fields. A
//! snapshot is never mutated once published; writers build the next one from
//! a copy and swap it in.

use crate::value_objects::config_key::ConfigKey;
use crate::value_objects::hook_whitelist::HookWhitelist;
use crate::value_objects::response_headers::ResponseHeaders;
use std::collections::BTreeSet;
use std::time::Duration;

/// Typed configuration values
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    /// Publish counter, incremented on every store write
    pub generation: u64,

    pub plugin_timeout_millis: u64,
    pub hooks_ignore: Vec<String>,
    pub inject_url_prefix: String,
    pub request_param_encoding: String,
    pub body_max_bytes: u32,
    /// Backup days plus the current day
    pub log_max_backup: u32,
    pub plugin_max_stack: u32,
    pub lru_max_size: u32,
    pub plugin_filter: bool,
    pub ognl_min_length: u32,
    pub sql_slow_query_min_rows: u32,
    pub block_status_code: u16,
    pub debug_level: u32,
    pub algorithm_config: serde_json::Value,
    /// Derived from `algorithm.config` at `sql_exception.mysql.error_code`
    pub sql_error_codes: BTreeSet<i64>,
    pub client_ip_header: String,
    pub block_redirect_url: String,
    pub block_content_json: String,
    pub block_content_xml: String,
    pub block_content_html: String,

    pub cloud_enable: bool,
    pub cloud_backend_url: String,
    pub cloud_app_id: String,
    pub cloud_app_secret: String,
    pub rasp_id: String,
    pub heartbeat_interval: u32,

    pub syslog_enable: bool,
    pub syslog_url: String,
    pub syslog_tag: String,
    pub syslog_facility: u8,
    pub syslog_reconnect_interval: u32,
    pub log_max_burst: u32,

    pub hook_whitelist: HookWhitelist,
    pub hook_white_all: bool,
    pub decompile_enable: bool,
    pub response_headers: ResponseHeaders,

    pub cpu_usage_percent: u8,
    pub cpu_usage_enable: bool,
    pub cpu_usage_interval: u32,
    pub https_verify_peer: bool,

    pub lru_compare_enable: bool,
    pub lru_compare_limit: u32,
}

impl Default for ConfigSnapshot {
    /// Mirrors the `default_value` of every [`ConfigKey`] after conversion
    fn default() -> Self {
        Self {
            generation: 0,
            plugin_timeout_millis: 100,
            hooks_ignore: Vec::new(),
            inject_url_prefix: String::new(),
            request_param_encoding: String::new(),
            body_max_bytes: 12288,
            log_max_backup: 31,
            plugin_max_stack: 100,
            lru_max_size: 1024,
            plugin_filter: true,
            ognl_min_length: 30,
            sql_slow_query_min_rows: 500,
            block_status_code: 302,
            debug_level: 0,
            algorithm_config: serde_json::Value::Object(serde_json::Map::new()),
            sql_error_codes: BTreeSet::new(),
            client_ip_header: ConfigKey::ClientIpHeader.default_value().to_string(),
            block_redirect_url: ConfigKey::BlockRedirectUrl.default_value().to_string(),
            block_content_json: ConfigKey::BlockContentJson.default_value().to_string(),
            block_content_xml: ConfigKey::BlockContentXml.default_value().to_string(),
            block_content_html: ConfigKey::BlockContentHtml.default_value().to_string(),
            cloud_enable: false,
            cloud_backend_url: String::new(),
            cloud_app_id: String::new(),
            cloud_app_secret: String::new(),
            rasp_id: String::new(),
            heartbeat_interval: 90,
            syslog_enable: false,
            syslog_url: String::new(),
            syslog_tag: ConfigKey::SyslogTag.default_value().to_string(),
            syslog_facility: 1,
            syslog_reconnect_interval: 300_000,
            log_max_burst: 100,
            hook_whitelist: HookWhitelist::new(),
            hook_white_all: true,
            decompile_enable: false,
            response_headers: ResponseHeaders::new(),
            cpu_usage_percent: 90,
            cpu_usage_enable: false,
            cpu_usage_interval: 5,
            https_verify_peer: false,
            lru_compare_enable: false,
            lru_compare_limit: 10240,
        }
    }
}

impl ConfigSnapshot {
    /// Debug output is on for any positive level
    pub fn is_debug_enabled(&self) -> bool {
        self.debug_level > 0
    }

    /// Delay between two heartbeats
    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.heartbeat_interval))
    }

    /// Plugin execution budget
    pub fn plugin_timeout(&self) -> Duration {
        Duration::from_millis(self.plugin_timeout_millis)
    }

    /// Whether a hook point is listed in `hooks.ignore`
    pub fn is_hook_ignored(&self, hook: &str) -> bool {
        self.hooks_ignore.iter().any(|h| h == hook)
    }

    /// Current value of a key, rendered for log records
    ///
    /// Secrets are masked.
    pub fn value_text(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::PluginTimeoutMillis => self.plugin_timeout_millis.to_string(),
            ConfigKey::HooksIgnore => format!("{:?}", self.hooks_ignore),
            ConfigKey::InjectUrlPrefix => self.inject_url_prefix.clone(),
            ConfigKey::RequestParamEncoding => self.request_param_encoding.clone(),
            ConfigKey::BodyMaxBytes => self.body_max_bytes.to_string(),
            ConfigKey::LogMaxBackup => self.log_max_backup.to_string(),
            ConfigKey::PluginMaxStack => self.plugin_max_stack.to_string(),
            ConfigKey::LruMaxSize => self.lru_max_size.to_string(),
            ConfigKey::PluginFilter => self.plugin_filter.to_string(),
            ConfigKey::OgnlMinLength => self.ognl_min_length.to_string(),
            ConfigKey::SqlSlowQueryMinRows => self.sql_slow_query_min_rows.to_string(),
            ConfigKey::BlockStatusCode => self.block_status_code.to_string(),
            ConfigKey::DebugLevel => self.debug_level.to_string(),
            ConfigKey::AlgorithmConfig => self.algorithm_config.to_string(),
            ConfigKey::ClientIpHeader => self.client_ip_header.clone(),
            ConfigKey::BlockRedirectUrl => self.block_redirect_url.clone(),
            ConfigKey::BlockContentJson => self.block_content_json.clone(),
            ConfigKey::BlockContentXml => self.block_content_xml.clone(),
            ConfigKey::BlockContentHtml => self.block_content_html.clone(),
            ConfigKey::CloudEnable => self.cloud_enable.to_string(),
            ConfigKey::CloudBackendUrl => self.cloud_backend_url.clone(),
            ConfigKey::CloudAppId => self.cloud_app_id.clone(),
            ConfigKey::CloudAppSecret => mask_secret(&self.cloud_app_secret),
            ConfigKey::RaspId => self.rasp_id.clone(),
            ConfigKey::SyslogEnable => self.syslog_enable.to_string(),
            ConfigKey::SyslogUrl => self.syslog_url.clone(),
            ConfigKey::SyslogTag => self.syslog_tag.clone(),
            ConfigKey::SyslogFacility => self.syslog_facility.to_string(),
            ConfigKey::SyslogReconnectInterval => self.syslog_reconnect_interval.to_string(),
            ConfigKey::LogMaxBurst => self.log_max_burst.to_string(),
            ConfigKey::HeartbeatInterval => self.heartbeat_interval.to_string(),
            ConfigKey::HookWhite => self.hook_whitelist.to_string(),
            ConfigKey::HookWhiteAll => self.hook_white_all.to_string(),
            ConfigKey::DecompileEnable => self.decompile_enable.to_string(),
            ConfigKey::ResponseHeaders => self.response_headers.to_string(),
            ConfigKey::CpuUsagePercent => self.cpu_usage_percent.to_string(),
            ConfigKey::CpuUsageEnable => self.cpu_usage_enable.to_string(),
            ConfigKey::CpuUsageInterval => self.cpu_usage_interval.to_string(),
            ConfigKey::HttpsVerifyPeer => self.https_verify_peer.to_string(),
            ConfigKey::LruCompareEnable => self.lru_compare_enable.to_string(),
            ConfigKey::LruCompareLimit => self.lru_compare_limit.to_string(),
        }
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "******".to_string()
    }
}
