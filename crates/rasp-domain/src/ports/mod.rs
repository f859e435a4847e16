//! Domain Port Interfaces
//!
//! Contracts for the collaborators the configuration engine drives but does
//! not own. Infrastructure provides the implementations; tests provide fakes.
//!
//! - **cache** - the capacity-bound verdict cache shaped by `lru.*` keys
//! - **remote** - the control plane that supplies managed configuration

/// Dependent cache port
pub mod cache;
/// Remote configuration source port
pub mod remote;

pub use cache::DependentCache;
pub use remote::{RemoteConfigSource, SharedRemoteConfigSource};
