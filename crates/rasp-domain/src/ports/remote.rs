//! Remote Configuration Source Port
//!
//! Defines how the heartbeat task obtains the managed configuration. The wire
//! protocol belongs to the implementation; the engine only sees a key → value
//! map of already-typed values.

use crate::error::Result;
use crate::value_objects::RawConfigMap;
use async_trait::async_trait;
use std::sync::Arc;

/// Control plane that supplies the current configuration map
///
/// # Example
///
/// ```ignore
/// use rasp_domain::ports::RemoteConfigSource;
///
/// async fn tick(source: &dyn RemoteConfigSource) -> rasp_domain::Result<()> {
///     let config = source.fetch().await?;
///     println!("{} keys", config.len());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RemoteConfigSource: Send + Sync {
    /// Fetch the full configuration map
    ///
    /// Failures are reported as `Error::TransientSync` and only skip the
    /// current tick.
    async fn fetch(&self) -> Result<RawConfigMap>;

    /// Name used in log records
    fn source_name(&self) -> &str;
}

/// Shared remote source for dependency injection
pub type SharedRemoteConfigSource = Arc<dyn RemoteConfigSource>;
