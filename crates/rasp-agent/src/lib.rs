//! # RASP Agent
//!
//! Dynamic configuration engine of a runtime application self-protection
//! agent: one concurrently-read store of every tunable parameter, fed by the
//! local YAML document or by the control plane heartbeat.
//!
//! ## Example
//!
//! ```ignore
//! use rasp_agent::{AgentSettings, bootstrap};
//!
//! let engine = bootstrap::start(&AgentSettings::default())?;
//! let snapshot = engine.store().snapshot();
//! assert!(snapshot.block_status_code >= 100);
//! ```
//!
//! ## Architecture
//!
//! - `domain` - keys, typed values, whitelist, snapshot, ports, errors
//! - `infrastructure` - store, setters, cache, periodic task, sync engine
//! - [`bootstrap`] - composition root used by the binary

pub mod bootstrap;

/// Domain layer - keys, values and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use rasp_domain::*;
}

/// Infrastructure layer - store, sync and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use rasp_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the entry points at the crate root
pub use bootstrap::{run, start};
pub use infrastructure::{AgentSettings, ConfigStore, SettingsLoader, SyncEngine};
