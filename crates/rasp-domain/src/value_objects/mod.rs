//! Domain Value Objects
//!
//! Immutable values that describe configuration: the declared key set, the
//! tagged raw values sources deliver, and the typed snapshot readers consume.
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`ConfigKey`] | Closed set of dynamic configuration keys |
//! | [`ConfigValue`] | Tagged raw value produced at parse time |
//! | [`CheckType`] | Detection category and its whitelist bit |
//! | [`HookWhitelist`] | Hook point → suppression mask |
//! | [`ResponseHeaders`] | Validated custom response headers |
//! | [`ConfigSnapshot`] | Published typed configuration values |

/// Detection check types
pub mod check_type;
/// Declared configuration keys
pub mod config_key;
/// Tagged raw values
pub mod config_value;
/// Hook whitelist parsing
pub mod hook_whitelist;
/// Custom response headers
pub mod response_headers;
/// Typed configuration snapshot
pub mod snapshot;

// Re-export commonly used value objects
pub use check_type::CheckType;
pub use config_key::ConfigKey;
pub use config_value::{ConfigValue, RawConfigMap};
pub use hook_whitelist::HookWhitelist;
pub use response_headers::ResponseHeaders;
pub use snapshot::ConfigSnapshot;
