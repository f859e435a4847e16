//! # RASP Domain
//!
//! Core types of the agent's dynamic configuration engine.
//!
//! - [`value_objects`] - keys, tagged raw values, whitelist, headers, snapshot
//! - [`ports`] - contracts for the dependent cache and the remote source
//! - [`events`] - reload notifications and write origins
//! - [`error`] - the error taxonomy shared by every layer

/// Domain constants
pub mod constants;
/// Error handling types
pub mod error;
/// Reload events and write origins
pub mod events;
/// Port interfaces
pub mod ports;
/// Value objects
pub mod value_objects;

pub use error::{Error, Result};
pub use events::{ConfigEvent, ConfigSource};
pub use value_objects::*;
