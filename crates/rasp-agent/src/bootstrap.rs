//! Composition root
//!
//! Wires the cache, the store and the sync engine from the agent settings.
//! The store is built exactly once here and shared by reference.

use anyhow::Context;
use rasp_domain::ports::SharedRemoteConfigSource;
use rasp_domain::{ConfigSnapshot, Result};
use rasp_infrastructure::cache::DependentCacheManager;
use rasp_infrastructure::logging::init_logging;
use rasp_infrastructure::sync::{AgentLayout, HttpRemoteConfigSource, RemoteSourceFactory};
use rasp_infrastructure::{AgentSettings, ConfigStore, SettingsLoader, SyncEngine};
use std::path::Path;
use std::sync::Arc;

/// Build the store and boot the sync engine
///
/// Must run inside a tokio runtime when the document enables managed mode.
pub fn start(settings: &AgentSettings) -> anyhow::Result<SyncEngine> {
    let cache = Arc::new(DependentCacheManager::default());
    let store = Arc::new(ConfigStore::new(cache));
    let layout = AgentLayout::new(settings.base_dir.clone());

    let remote_config = settings.remote.clone();
    let remote: RemoteSourceFactory = Box::new(move |snapshot: &ConfigSnapshot| -> Result<_> {
        let source: SharedRemoteConfigSource =
            Arc::new(HttpRemoteConfigSource::new(snapshot, &remote_config)?);
        Ok(source)
    });

    SyncEngine::boot(store, layout, remote).context("Failed to boot configuration engine")
}

/// Run the agent until interrupted
///
/// `base_dir` overrides the settings' base directory.
pub async fn run(settings_path: Option<&Path>, base_dir: Option<&Path>) -> anyhow::Result<()> {
    let mut loader = SettingsLoader::new();
    if let Some(path) = settings_path {
        loader = loader.with_settings_path(path);
    }
    let mut settings = loader.load().context("Failed to load agent settings")?;
    if let Some(dir) = base_dir {
        settings.base_dir = dir.to_path_buf();
    }

    init_logging(settings.logging.clone()).context("Failed to initialize logging")?;
    tracing::info!("Starting RASP agent in {}", settings.base_dir.display());

    let mut engine = start(&settings)?;
    tracing::info!("Configuration engine running in {:?} mode", engine.mode());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    engine.shutdown();
    Ok(())
}
