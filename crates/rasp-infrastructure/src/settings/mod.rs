//! Agent settings
//!
//! Process-level settings loaded with figment, distinct from the dynamic
//! configuration keys held by the store.

pub mod loader;
pub mod types;

pub use loader::SettingsLoader;
pub use types::{AgentSettings, LoggingConfig, RemoteClientConfig};
