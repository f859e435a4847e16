//! # Infrastructure Layer
//!
//! Runtime machinery of the dynamic configuration engine: the store and its
//! setters, the verdict cache, the background task framework and the two
//! reload sources.
//!
//! ## Module Categories
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Snapshot store, per-key setters, YAML document |
//! | [`settings`] | Agent process settings via figment |
//! | [`constants`] | Layout, endpoint and channel constants |
//!
//! ### Runtime
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Moka verdict cache reshaped by `lru.*` keys |
//! | [`task`] | Suspendable periodic worker |
//! | [`sync`] | Boot sequence, file watch, heartbeat |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod cache;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;
pub mod settings;
pub mod sync;
pub mod task;

// Re-export commonly used types
pub use cache::DependentCacheManager;
pub use config::{ConfigStore, LoadReport};
pub use error_ext::ErrorContext;
pub use settings::{AgentSettings, SettingsLoader};
pub use sync::{AgentLayout, SyncEngine, SyncMode};
pub use task::{PeriodicTask, TaskAction, TaskState};
