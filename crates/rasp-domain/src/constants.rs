//! Domain layer constants
//!
//! Validation bounds and reserved names shared by the key table,
//! the structured parsers and their tests.

// ============================================================================
// RESERVED DOCUMENT NAMES
// ============================================================================

/// Hook whitelist wildcard name in the document
pub const HOOK_WILDCARD: &str = "*";

/// Key under which the global whitelist mask is stored
pub const HOOK_GLOBAL_KEY: &str = "";

/// Whitelist value that expands to every check type
pub const HOOK_ALL_CHECKS: &str = "all";

/// Prefix shared by remote-channel keys the remote source may not set
pub const CLOUD_KEY_PREFIX: &str = "cloud.";

// ============================================================================
// VALIDATION BOUNDS
// ============================================================================

/// Minimum identity id length
pub const RASP_ID_MIN_LEN: usize = 16;

/// Maximum identity id length
pub const RASP_ID_MAX_LEN: usize = 512;

/// Maximum response header name/value length
pub const RESPONSE_HEADER_MAX_LEN: usize = 200;

/// Valid block status code range
pub const BLOCK_STATUS_CODE_RANGE: (i64, i64) = (100, 999);

/// Valid syslog facility range
pub const SYSLOG_FACILITY_RANGE: (i64, i64) = (0, 23);

/// Valid heartbeat interval range in seconds
pub const HEARTBEAT_INTERVAL_RANGE: (i64, i64) = (10, 1800);

/// Valid CPU usage percentage range
pub const CPU_USAGE_PERCENT_RANGE: (i64, i64) = (30, 100);

/// Valid CPU usage check interval range in seconds
pub const CPU_USAGE_INTERVAL_RANGE: (i64, i64) = (1, 1800);

/// Upper bound (inclusive) of the LRU compare limit in bytes
pub const LRU_COMPARE_LIMIT_MAX: i64 = 102_400;

/// SQL error codes above this count trigger a warning
pub const MAX_SQL_ERROR_CODES: usize = 100;
