//! Heartbeat action
//!
//! One tick of managed mode: fetch the remote map and bulk-load it.

use crate::config::ConfigStore;
use crate::task::TaskAction;
use async_trait::async_trait;
use rasp_domain::error::{Error, Result};
use rasp_domain::ports::SharedRemoteConfigSource;
use rasp_domain::ConfigEvent;
use std::sync::Arc;
use tokio::sync::broadcast::Sender;

/// Fetches the managed configuration and applies it to the store
pub struct HeartbeatAction {
    store: Arc<ConfigStore>,
    source: SharedRemoteConfigSource,
    events: Sender<ConfigEvent>,
}

impl HeartbeatAction {
    /// Create the action
    pub fn new(
        store: Arc<ConfigStore>,
        source: SharedRemoteConfigSource,
        events: Sender<ConfigEvent>,
    ) -> Self {
        Self {
            store,
            source,
            events,
        }
    }

    // Send fails only when nobody is subscribed, which is fine
    fn publish(&self, event: ConfigEvent) {
        self.events.send(event).ok();
    }
}

#[async_trait]
impl TaskAction for HeartbeatAction {
    fn name(&self) -> &str {
        "heartbeat"
    }

    async fn execute(&self) -> Result<()> {
        let config = self.source.fetch().await?;
        if config.is_empty() {
            tracing::debug!(
                "[HEARTBEAT] no configuration update from {}",
                self.source.source_name()
            );
            return Ok(());
        }
        let report = self.store.load_from_cloud(&config);
        tracing::info!(
            "[HEARTBEAT] applied configuration from {}: {} changed, {} rejected",
            self.source.source_name(),
            report.changed.len(),
            report.rejected.len()
        );
        self.publish(ConfigEvent::Reloaded {
            source: report.source,
            generation: report.generation,
            rejected: report.rejected_names(),
        });
        Ok(())
    }

    async fn handle_error(&self, error: &Error) {
        tracing::warn!("[HEARTBEAT] skipping this tick: {}", error);
        self.publish(ConfigEvent::ReloadFailed(error.to_string()));
    }
}
