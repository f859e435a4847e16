//! Agent settings types
//!
//! Process-level settings of the agent itself: where it lives, how it logs and
//! how it talks to the control plane. The dynamic configuration keys are not
//! part of these; they come from the document and the remote source.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Agent base directory (holds `conf/` and `assets/`)
    pub base_dir: PathBuf,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Control plane client configuration
    pub remote: RemoteClientConfig,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            logging: LoggingConfig::default(),
            remote: RemoteClientConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Control plane HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteClientConfig {
    /// Total timeout for a heartbeat request in seconds
    pub timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for RemoteClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: REMOTE_REQUEST_TIMEOUT_SECS,
            user_agent: format!("rasp-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RemoteClientConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
