//! Sync engine
//!
//! Boots the store from the local document and then keeps it current from
//! exactly one source: the filesystem watcher in standalone mode, or the
//! heartbeat task in managed mode. The mode is fixed at boot.

use super::custom_page::CustomResponsePage;
use super::heartbeat::HeartbeatAction;
use super::layout::AgentLayout;
use super::watcher::{ConfigFileWatcher, WatchTarget};
use crate::config::{ConfigStore, LoadReport, read_document};
use crate::constants::CONFIG_EVENT_CHANNEL_CAPACITY;
use crate::logging::log_config_loaded;
use crate::task::PeriodicTask;
use rasp_domain::error::Result;
use rasp_domain::ports::SharedRemoteConfigSource;
use rasp_domain::value_objects::ConfigSnapshot;
use rasp_domain::ConfigEvent;
use std::sync::Arc;
use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{info, warn};

/// Builds the remote source from the snapshot loaded at boot
pub type RemoteSourceFactory =
    Box<dyn FnOnce(&ConfigSnapshot) -> Result<SharedRemoteConfigSource> + Send>;

/// Which source keeps the store current after boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Local document, reloaded on filesystem events
    Standalone,
    /// Remote control plane, polled by the heartbeat task
    Managed,
}

/// Reload entry point shared by the watcher callback and manual reloads
struct FileReloader {
    store: Arc<ConfigStore>,
    layout: AgentLayout,
    custom_page: Arc<CustomResponsePage>,
    events: Sender<ConfigEvent>,
    boot_cloud_enable: bool,
}

impl FileReloader {
    // Send fails only when nobody is subscribed, which is fine
    fn publish(&self, event: ConfigEvent) {
        self.events.send(event).ok();
    }

    fn on_target(&self, target: WatchTarget) {
        match target {
            WatchTarget::ConfigDocument => {
                self.reload_document(false);
            }
            WatchTarget::CustomPage => {
                let present = self.custom_page.load();
                self.publish(ConfigEvent::CustomPageReloaded { present });
            }
        }
    }

    // A missing or malformed document loads defaults
    fn reload_document(&self, is_init: bool) -> LoadReport {
        let path = self.layout.config_file();
        let document = match read_document(&path) {
            Ok(Some(document)) => {
                log_config_loaded(&path, true);
                Some(document)
            }
            Ok(None) => {
                log_config_loaded(&path, false);
                None
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                self.publish(ConfigEvent::ReloadFailed(e.to_string()));
                None
            }
        };
        let report = self.store.load_from_file(document.as_ref(), is_init);

        if !is_init {
            let cloud_enable = self.store.load().cloud_enable;
            if cloud_enable != self.boot_cloud_enable {
                warn!(
                    "cloud.enable changed to {}; the sync mode only changes after a restart",
                    cloud_enable
                );
            }
        }
        self.publish(ConfigEvent::Reloaded {
            source: report.source,
            generation: report.generation,
            rejected: report.rejected_names(),
        });
        report
    }
}

/// Owner of the reload sources
pub struct SyncEngine {
    mode: SyncMode,
    reloader: Arc<FileReloader>,
    watcher: Option<ConfigFileWatcher>,
    heartbeat: Option<PeriodicTask>,
}

impl SyncEngine {
    /// Boot the store and start the mode's reload source
    ///
    /// Fails on a malformed `rasp.id`, a watch that cannot be registered, or
    /// a managed mode that cannot build its remote source or start its task.
    pub fn boot(
        store: Arc<ConfigStore>,
        layout: AgentLayout,
        remote: RemoteSourceFactory,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(CONFIG_EVENT_CHANNEL_CAPACITY);
        let custom_page = Arc::new(CustomResponsePage::new(layout.custom_page_file()));
        let mut reloader = FileReloader {
            store: Arc::clone(&store),
            layout,
            custom_page,
            events,
            boot_cloud_enable: false,
        };

        reloader.reload_document(true);
        store.check_major_config()?;

        let snapshot = store.snapshot();
        reloader.boot_cloud_enable = snapshot.cloud_enable;
        let reloader = Arc::new(reloader);

        if snapshot.cloud_enable {
            let source = remote(&snapshot)?;
            let action = HeartbeatAction::new(
                Arc::clone(&store),
                source,
                reloader.events.clone(),
            );
            let task = PeriodicTask::new(Arc::new(action), snapshot.heartbeat_period());
            task.start()?;
            info!(
                "managed mode: heartbeat every {}s",
                snapshot.heartbeat_interval
            );
            Ok(Self {
                mode: SyncMode::Managed,
                reloader,
                watcher: None,
                heartbeat: Some(task),
            })
        } else {
            reloader.custom_page.load();
            let callback = Arc::clone(&reloader);
            let watcher =
                ConfigFileWatcher::start(&reloader.layout, move |target| callback.on_target(target))?;
            info!("standalone mode: watching {}", reloader.layout.config_file().display());
            Ok(Self {
                mode: SyncMode::Standalone,
                reloader,
                watcher: Some(watcher),
                heartbeat: None,
            })
        }
    }

    /// Mode chosen at boot
    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// The store this engine feeds
    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.reloader.store
    }

    /// Current custom response page holder
    pub fn custom_page(&self) -> &Arc<CustomResponsePage> {
        &self.reloader.custom_page
    }

    /// Subscribe to reload events
    pub fn subscribe(&self) -> Receiver<ConfigEvent> {
        self.reloader.events.subscribe()
    }

    /// Reload the local document now, as a watch event would
    pub fn reload_file(&self) -> LoadReport {
        self.reloader.reload_document(false)
    }

    /// Heartbeat task, in managed mode
    pub fn heartbeat(&self) -> Option<&PeriodicTask> {
        self.heartbeat.as_ref()
    }

    /// Filesystem watch, in standalone mode
    pub fn watcher(&self) -> Option<&ConfigFileWatcher> {
        self.watcher.as_ref()
    }

    /// Stop the heartbeat and drop the watch
    pub fn shutdown(&mut self) {
        if let Some(task) = &self.heartbeat {
            task.stop();
        }
        self.watcher = None;
        info!("sync engine stopped");
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("mode", &self.mode)
            .field("layout", &self.reloader.layout)
            .finish()
    }
}
