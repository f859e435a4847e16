//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Validation bounds for configuration keys live in `rasp_domain::constants`.

// ============================================================================
// AGENT LAYOUT CONSTANTS
// ============================================================================

/// Directory under the base directory holding the configuration document
pub const CONFIG_DIR_NAME: &str = "conf";

/// Configuration document file name
pub const CONFIG_FILE_NAME: &str = "openrasp.yml";

/// Directory under the base directory holding the custom response page
pub const CUSTOM_RESPONSE_DIR_NAME: &str = "assets";

/// Custom response page file name
pub const CUSTOM_RESPONSE_FILE_NAME: &str = "inject.html";

// ============================================================================
// AGENT SETTINGS CONSTANTS
// ============================================================================

/// Environment variable prefix for agent settings
pub const SETTINGS_ENV_PREFIX: &str = "RASP";

/// Default agent settings file name
pub const DEFAULT_SETTINGS_FILENAME: &str = "rasp-agent.toml";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "RASP_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file stem when file output has no stem
pub const DEFAULT_LOG_FILE_STEM: &str = "rasp";

// ============================================================================
// REMOTE CONTROL PLANE CONSTANTS
// ============================================================================

/// Heartbeat endpoint path, appended to `cloud.backend_url`
pub const HEARTBEAT_PATH: &str = "/v1/agent/heartbeat";

/// Header carrying the application id
pub const APP_ID_HEADER: &str = "X-OpenRASP-AppID";

/// Header carrying the application secret
pub const APP_SECRET_HEADER: &str = "X-OpenRASP-AppSecret";

/// Default request timeout for control plane calls in seconds
pub const REMOTE_REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// SYNC CONSTANTS
// ============================================================================

/// Capacity of the configuration event broadcast channel
pub const CONFIG_EVENT_CHANNEL_CAPACITY: usize = 16;
