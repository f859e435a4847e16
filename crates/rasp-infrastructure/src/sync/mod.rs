//! Configuration sync
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | boot sequence and mode selection |
//! | [`watcher`] | standalone mode filesystem watch |
//! | [`heartbeat`] | managed mode tick |
//! | [`remote`] | HTTP control plane source |
//! | [`custom_page`] | custom response page holder |
//! | [`layout`] | on-disk paths |

pub mod custom_page;
pub mod engine;
pub mod heartbeat;
pub mod layout;
pub mod remote;
pub mod watcher;

pub use custom_page::CustomResponsePage;
pub use engine::{RemoteSourceFactory, SyncEngine, SyncMode};
pub use heartbeat::HeartbeatAction;
pub use layout::AgentLayout;
pub use remote::{HttpRemoteConfigSource, parse_heartbeat_response};
pub use watcher::{ConfigFileWatcher, WatchTarget, classify, recreated_dirs};
