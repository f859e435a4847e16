//! Configuration events
//!
//! Published by the sync engine after reloads so dependent subsystems
//! (log appenders, the CPU breaker, response injection) can react.

use std::fmt;

/// Origin of a configuration write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    /// The local document, at boot or after a change event
    File,
    /// The remote control plane heartbeat
    Cloud,
    /// An in-process caller of `set_config`
    Runtime,
}

impl ConfigSource {
    /// Lower-case label used in log fields
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Cloud => "cloud",
            Self::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification emitted by the sync engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A bulk load finished and a new snapshot is published
    Reloaded {
        /// Where the values came from
        source: ConfigSource,
        /// Generation of the published snapshot
        generation: u64,
        /// Keys that failed validation during the load
        rejected: Vec<String>,
    },
    /// A reload could not run at all
    ReloadFailed(String),
    /// The custom response page was (re)loaded
    CustomPageReloaded {
        /// Whether a page is now present
        present: bool,
    },
}
