//! Per-key setter table
//!
//! Maps every [`ConfigKey`] to the function that converts its text form,
//! validates it and writes the typed value into a draft snapshot. Adding or
//! removing a key means editing this table, not a dispatch chain.
//!
//! Setters are all-or-nothing for their field: they validate completely before
//! touching the draft or the dependent cache.

use rasp_domain::constants::*;
use rasp_domain::error::{Error, Result};
use rasp_domain::ports::DependentCache;
use rasp_domain::value_objects::{
    ConfigKey, ConfigSnapshot, ConfigValue, HookWhitelist, ResponseHeaders,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::{info, warn};

/// State a setter may touch
pub(crate) struct SetterContext<'a> {
    /// Snapshot being built
    pub draft: &'a mut ConfigSnapshot,
    /// Cache reshaped by `lru.*` keys
    pub cache: &'a dyn DependentCache,
    /// Whether this is the boot-time load
    pub is_init: bool,
}

/// Convert, validate and apply one key's text value
pub(crate) type ApplyFn = fn(&mut SetterContext<'_>, &str) -> Result<()>;

static SETTERS: LazyLock<HashMap<ConfigKey, ApplyFn>> = LazyLock::new(|| {
    use ConfigKey as K;
    let table: [(ConfigKey, ApplyFn); 41] = [
        (K::PluginTimeoutMillis, |ctx, v| {
            ctx.draft.plugin_timeout_millis = narrow(K::PluginTimeoutMillis, positive(K::PluginTimeoutMillis, v)?)?;
            Ok(())
        }),
        (K::HooksIgnore, |ctx, v| {
            ctx.draft.hooks_ignore = split_list(v);
            Ok(())
        }),
        (K::InjectUrlPrefix, |ctx, v| {
            ctx.draft.inject_url_prefix = v.trim_end_matches('/').to_string();
            Ok(())
        }),
        (K::RequestParamEncoding, |ctx, v| {
            ctx.draft.request_param_encoding = v.to_string();
            Ok(())
        }),
        (K::BodyMaxBytes, |ctx, v| {
            ctx.draft.body_max_bytes = narrow(K::BodyMaxBytes, positive(K::BodyMaxBytes, v)?)?;
            Ok(())
        }),
        (K::LogMaxBackup, |ctx, v| {
            // Stored as backup days plus the current day
            let days = non_negative(K::LogMaxBackup, v)?;
            ctx.draft.log_max_backup = narrow(K::LogMaxBackup, days + 1)?;
            Ok(())
        }),
        (K::PluginMaxStack, |ctx, v| {
            ctx.draft.plugin_max_stack = narrow(K::PluginMaxStack, non_negative(K::PluginMaxStack, v)?)?;
            Ok(())
        }),
        (K::LruMaxSize, set_lru_max_size),
        (K::PluginFilter, |ctx, v| {
            ctx.draft.plugin_filter = parse_bool(v);
            Ok(())
        }),
        (K::OgnlMinLength, |ctx, v| {
            ctx.draft.ognl_min_length = narrow(K::OgnlMinLength, positive(K::OgnlMinLength, v)?)?;
            Ok(())
        }),
        (K::SqlSlowQueryMinRows, |ctx, v| {
            ctx.draft.sql_slow_query_min_rows =
                narrow(K::SqlSlowQueryMinRows, non_negative(K::SqlSlowQueryMinRows, v)?)?;
            Ok(())
        }),
        (K::BlockStatusCode, |ctx, v| {
            ctx.draft.block_status_code =
                narrow(K::BlockStatusCode, in_range(K::BlockStatusCode, v, BLOCK_STATUS_CODE_RANGE)?)?;
            Ok(())
        }),
        (K::DebugLevel, set_debug_level),
        (K::AlgorithmConfig, set_algorithm_config),
        (K::ClientIpHeader, |ctx, v| {
            ctx.draft.client_ip_header = v.to_string();
            Ok(())
        }),
        (K::BlockRedirectUrl, |ctx, v| {
            ctx.draft.block_redirect_url = if v.is_empty() {
                K::BlockRedirectUrl.default_value().to_string()
            } else {
                v.to_string()
            };
            Ok(())
        }),
        (K::BlockContentJson, |ctx, v| {
            ctx.draft.block_content_json = v.to_string();
            Ok(())
        }),
        (K::BlockContentXml, |ctx, v| {
            ctx.draft.block_content_xml = v.to_string();
            Ok(())
        }),
        (K::BlockContentHtml, |ctx, v| {
            ctx.draft.block_content_html = v.to_string();
            Ok(())
        }),
        (K::CloudEnable, |ctx, v| {
            ctx.draft.cloud_enable = parse_bool(v);
            Ok(())
        }),
        (K::CloudBackendUrl, |ctx, v| {
            ctx.draft.cloud_backend_url = v.to_string();
            Ok(())
        }),
        (K::CloudAppId, |ctx, v| {
            ctx.draft.cloud_app_id = v.to_string();
            Ok(())
        }),
        (K::CloudAppSecret, |ctx, v| {
            ctx.draft.cloud_app_secret = v.to_string();
            Ok(())
        }),
        (K::RaspId, set_rasp_id),
        (K::SyslogEnable, |ctx, v| {
            ctx.draft.syslog_enable = parse_bool(v);
            Ok(())
        }),
        (K::SyslogUrl, |ctx, v| {
            ctx.draft.syslog_url = v.to_string();
            Ok(())
        }),
        (K::SyslogTag, |ctx, v| {
            ctx.draft.syslog_tag = v.to_string();
            Ok(())
        }),
        (K::SyslogFacility, |ctx, v| {
            ctx.draft.syslog_facility =
                narrow(K::SyslogFacility, in_range(K::SyslogFacility, v, SYSLOG_FACILITY_RANGE)?)?;
            Ok(())
        }),
        (K::SyslogReconnectInterval, |ctx, v| {
            ctx.draft.syslog_reconnect_interval =
                narrow(K::SyslogReconnectInterval, positive(K::SyslogReconnectInterval, v)?)?;
            Ok(())
        }),
        (K::LogMaxBurst, |ctx, v| {
            ctx.draft.log_max_burst = narrow(K::LogMaxBurst, non_negative(K::LogMaxBurst, v)?)?;
            Ok(())
        }),
        (K::HeartbeatInterval, |ctx, v| {
            ctx.draft.heartbeat_interval =
                narrow(K::HeartbeatInterval, in_range(K::HeartbeatInterval, v, HEARTBEAT_INTERVAL_RANGE)?)?;
            Ok(())
        }),
        (K::HookWhite, |ctx, v| {
            let section = parse_section(K::HookWhite, v)?;
            apply_hook_whitelist(ctx, &section);
            Ok(())
        }),
        (K::HookWhiteAll, |ctx, v| {
            ctx.draft.hook_white_all = parse_bool(v);
            Ok(())
        }),
        (K::DecompileEnable, |ctx, v| {
            ctx.draft.decompile_enable = parse_bool(v);
            Ok(())
        }),
        (K::ResponseHeaders, |ctx, v| {
            let section = parse_section(K::ResponseHeaders, v)?;
            apply_response_headers(ctx, &section)
        }),
        (K::CpuUsagePercent, |ctx, v| {
            ctx.draft.cpu_usage_percent =
                narrow(K::CpuUsagePercent, in_range(K::CpuUsagePercent, v, CPU_USAGE_PERCENT_RANGE)?)?;
            Ok(())
        }),
        (K::CpuUsageEnable, |ctx, v| {
            ctx.draft.cpu_usage_enable = parse_bool(v);
            Ok(())
        }),
        (K::CpuUsageInterval, |ctx, v| {
            ctx.draft.cpu_usage_interval =
                narrow(K::CpuUsageInterval, in_range(K::CpuUsageInterval, v, CPU_USAGE_INTERVAL_RANGE)?)?;
            Ok(())
        }),
        (K::HttpsVerifyPeer, |ctx, v| {
            ctx.draft.https_verify_peer = parse_bool(v);
            Ok(())
        }),
        (K::LruCompareEnable, set_lru_compare_enable),
        (K::LruCompareLimit, set_lru_compare_limit),
    ];
    table.into_iter().collect()
});

/// Setter registered for `key`
pub(crate) fn setter_for(key: ConfigKey) -> Result<ApplyFn> {
    SETTERS
        .get(&key)
        .copied()
        .ok_or_else(|| Error::internal(format!("no setter registered for {}", key)))
}

/// Apply a nested section value (`hook.white` / `inject.custom_headers`)
///
/// A hook whitelist given as anything but a mapping yields an empty
/// whitelist; a header section that is not a mapping is rejected.
pub(crate) fn apply_structured(
    ctx: &mut SetterContext<'_>,
    key: ConfigKey,
    value: &ConfigValue,
) -> Result<()> {
    match key {
        ConfigKey::HookWhite => {
            let empty = Default::default();
            apply_hook_whitelist(ctx, value.as_map().unwrap_or(&empty));
            Ok(())
        }
        ConfigKey::ResponseHeaders => match value.as_map() {
            Some(section) => apply_response_headers(ctx, section),
            None => Err(Error::validation(
                key.name(),
                format!("expected a mapping, found {}", value.kind()),
            )),
        },
        other => Err(Error::internal(format!("{} is not a structured key", other))),
    }
}

fn apply_hook_whitelist(
    ctx: &mut SetterContext<'_>,
    section: &std::collections::BTreeMap<String, ConfigValue>,
) {
    ctx.draft.hook_whitelist = HookWhitelist::parse(section);
}

fn apply_response_headers(
    ctx: &mut SetterContext<'_>,
    section: &std::collections::BTreeMap<String, ConfigValue>,
) -> Result<()> {
    ctx.draft.response_headers = ResponseHeaders::try_from_section(section)?;
    Ok(())
}

// Text form of a nested section: "" is the empty default, anything else JSON
fn parse_section(
    key: ConfigKey,
    text: &str,
) -> Result<std::collections::BTreeMap<String, ConfigValue>> {
    if text.trim().is_empty() {
        return Ok(Default::default());
    }
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::validation(key.name(), format!("invalid JSON: {}", e)))?;
    match ConfigValue::from(json) {
        ConfigValue::Map(map) => Ok(map),
        other => Err(Error::validation(
            key.name(),
            format!("expected a JSON object, found {}", other.kind()),
        )),
    }
}

fn set_lru_max_size(ctx: &mut SetterContext<'_>, v: &str) -> Result<()> {
    let capacity: u32 = narrow(ConfigKey::LruMaxSize, non_negative(ConfigKey::LruMaxSize, v)?)?;
    if ctx.cache.recreate(u64::from(capacity)) {
        info!(capacity, "verdict cache recreated");
    }
    ctx.draft.lru_max_size = capacity;
    Ok(())
}

fn set_lru_compare_enable(ctx: &mut SetterContext<'_>, v: &str) -> Result<()> {
    let enabled = parse_bool(v);
    if enabled != ctx.draft.lru_compare_enable {
        ctx.draft.lru_compare_enable = enabled;
        ctx.cache.clear();
    }
    Ok(())
}

fn set_lru_compare_limit(ctx: &mut SetterContext<'_>, v: &str) -> Result<()> {
    let key = ConfigKey::LruCompareLimit;
    let limit = parse_int(key, v)?;
    if limit <= 0 || limit > LRU_COMPARE_LIMIT_MAX {
        return Err(Error::validation(
            key.name(),
            format!("must be between [1,{}]", LRU_COMPARE_LIMIT_MAX),
        ));
    }
    let limit: u32 = narrow(key, limit)?;
    if limit < ctx.draft.lru_compare_limit {
        ctx.cache.clear();
    }
    ctx.draft.lru_compare_limit = limit;
    Ok(())
}

fn set_debug_level(ctx: &mut SetterContext<'_>, v: &str) -> Result<()> {
    let level = parse_int(ConfigKey::DebugLevel, v)?.max(0);
    let level: u32 = narrow(ConfigKey::DebugLevel, level)?;
    if level > 0 {
        info!("Debug output enabled, debug_level={}", level);
    }
    ctx.draft.debug_level = level;
    Ok(())
}

fn set_rasp_id(ctx: &mut SetterContext<'_>, v: &str) -> Result<()> {
    if !ctx.is_init && v != ctx.draft.rasp_id {
        return Err(Error::validation(
            ConfigKey::RaspId.name(),
            "can not update the value of rasp.id at runtime",
        ));
    }
    ctx.draft.rasp_id = v.to_string();
    Ok(())
}

fn set_algorithm_config(ctx: &mut SetterContext<'_>, v: &str) -> Result<()> {
    let key = ConfigKey::AlgorithmConfig;
    let json: serde_json::Value = serde_json::from_str(v)
        .map_err(|e| Error::validation(key.name(), format!("invalid JSON: {}", e)))?;
    if !json.is_object() {
        return Err(Error::validation(key.name(), "must be a JSON object"));
    }
    ctx.draft.sql_error_codes = extract_sql_error_codes(&json);
    ctx.draft.algorithm_config = json;
    Ok(())
}

/// Read `sql_exception.mysql.error_code` from the algorithm configuration
pub fn extract_sql_error_codes(config: &serde_json::Value) -> BTreeSet<i64> {
    let Some(codes) = config
        .get("sql_exception")
        .and_then(|e| e.get("mysql"))
        .and_then(|m| m.get("error_code"))
        .and_then(serde_json::Value::as_array)
    else {
        warn!("failed to get sql_exception.mysql.error_code from algorithm config");
        return BTreeSet::new();
    };
    if codes.len() > MAX_SQL_ERROR_CODES {
        warn!(
            "size of algorithm.config sql_exception.error_code can not be greater than {}",
            MAX_SQL_ERROR_CODES
        );
    }
    let mut result = BTreeSet::new();
    for code in codes {
        match code.as_i64() {
            Some(c) => {
                result.insert(c);
            }
            None => warn!("failed to add a json error code element: {}", code),
        }
    }
    info!("mysql sql error codes: {:?}", result);
    result
}

/// Identity id check run once at boot
///
/// An empty id is allowed; otherwise 16 to 512 ASCII letters and digits.
pub fn validate_rasp_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Ok(());
    }
    if id.len() < RASP_ID_MIN_LEN || id.len() > RASP_ID_MAX_LEN {
        return Err(Error::critical_boot(format!(
            "the length of rasp.id must be between [{},{}]",
            RASP_ID_MIN_LEN, RASP_ID_MAX_LEN
        )));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::critical_boot(
            "the rasp.id can only contain letters and numbers",
        ));
    }
    Ok(())
}

/// Boolean conversion: case-insensitive `true`, everything else false
pub fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

fn parse_int(key: ConfigKey, text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|e| Error::validation(key.name(), format!("{:?} is not an integer: {}", text, e)))
}

fn positive(key: ConfigKey, text: &str) -> Result<i64> {
    let value = parse_int(key, text)?;
    if value <= 0 {
        return Err(Error::validation(key.name(), "must be greater than 0"));
    }
    Ok(value)
}

fn non_negative(key: ConfigKey, text: &str) -> Result<i64> {
    let value = parse_int(key, text)?;
    if value < 0 {
        return Err(Error::validation(key.name(), "can not be less than 0"));
    }
    Ok(value)
}

fn in_range(key: ConfigKey, text: &str, (low, high): (i64, i64)) -> Result<i64> {
    let value = parse_int(key, text)?;
    if value < low || value > high {
        return Err(Error::validation(
            key.name(),
            format!("must be between [{},{}]", low, high),
        ));
    }
    Ok(value)
}

fn narrow<T: TryFrom<i64>>(key: ConfigKey, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| Error::validation(key.name(), format!("{} is out of range", value)))
}

fn split_list(text: &str) -> Vec<String> {
    text.replace(' ', "")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
