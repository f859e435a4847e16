//! Filesystem watcher for standalone mode
//!
//! Registers the base, `conf` and `assets` directories with notify and maps
//! raw events onto the two things the engine reloads. A watched directory
//! that is deleted and created again is registered again, so edits inside the
//! new directory keep triggering reloads.

use super::layout::AgentLayout;
use crate::error_ext::ErrorContext;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rasp_domain::error::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// What a filesystem event invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    /// The configuration document or its directory
    ConfigDocument,
    /// The custom response page or its directory
    CustomPage,
}

type WatcherSlot = Mutex<Option<RecommendedWatcher>>;
type Handler = dyn Fn(WatchTarget) + Send + Sync;

/// Live filesystem watch; dropping it ends the watch
pub struct ConfigFileWatcher {
    _watcher: Arc<WatcherSlot>,
    watched: Vec<PathBuf>,
}

impl ConfigFileWatcher {
    /// Start watching `layout`
    ///
    /// Missing `conf` and `assets` directories are created first. `handler`
    /// runs synchronously on notify's delivery thread, and on a short-lived
    /// thread after a recreated directory is registered again.
    pub fn start<F>(layout: &AgentLayout, handler: F) -> Result<Self>
    where
        F: Fn(WatchTarget) + Send + Sync + 'static,
    {
        for dir in [layout.config_dir(), layout.assets_dir()] {
            std::fs::create_dir_all(&dir)
                .watch_context(format!("Failed to create {}", dir.display()))?;
        }
        let layout = layout.canonicalized();
        let classifier = layout.clone();
        let handler: Arc<Handler> = Arc::new(handler);
        let slot: Arc<WatcherSlot> = Arc::new(Mutex::new(None));
        let weak_slot = Arc::downgrade(&slot);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for (dir, target) in recreated_dirs(&classifier, &event) {
                        rewatch(weak_slot.clone(), dir, target, Arc::clone(&handler));
                    }
                    for target in classify(&classifier, &event) {
                        handler(target);
                    }
                }
                Err(e) => tracing::warn!("file watch error: {}", e),
            },
            Config::default(),
        )
        .watch_context("Failed to create file watcher")?;

        let mut watched = Vec::new();
        for dir in layout.watched_dirs() {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .watch_context(format!("Failed to watch {}", dir.display()))?;
            tracing::info!("watching {}", dir.display());
            watched.push(dir);
        }
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(watcher);

        Ok(Self {
            _watcher: slot,
            watched,
        })
    }

    /// Directories registered at start
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

impl std::fmt::Debug for ConfigFileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFileWatcher")
            .field("watched", &self.watched)
            .finish()
    }
}

// Registering from notify's own delivery thread would wait on that thread,
// so the watch is added from a separate one. The handler runs again afterwards
// to pick up files written before the new watch was in place.
fn rewatch(slot: Weak<WatcherSlot>, dir: PathBuf, target: WatchTarget, handler: Arc<Handler>) {
    let spawned = std::thread::Builder::new()
        .name("rasp-rewatch".to_string())
        .spawn(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            {
                let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(watcher) = guard.as_mut() else {
                    return;
                };
                match watcher.watch(&dir, RecursiveMode::NonRecursive) {
                    Ok(()) => tracing::info!("watching recreated {}", dir.display()),
                    Err(e) => {
                        tracing::warn!("failed to watch recreated {}: {}", dir.display(), e);
                        return;
                    }
                }
            }
            handler(target);
        });
    if let Err(e) = spawned {
        tracing::warn!("failed to spawn rewatch thread: {}", e);
    }
}

/// Watched subdirectories created by an event, with the target each one feeds
pub fn recreated_dirs(layout: &AgentLayout, event: &Event) -> Vec<(PathBuf, WatchTarget)> {
    if !matches!(event.kind, EventKind::Create(_)) {
        return Vec::new();
    }
    let config_dir = layout.config_dir();
    let assets_dir = layout.assets_dir();
    let mut dirs: Vec<(PathBuf, WatchTarget)> = Vec::new();
    for path in &event.paths {
        let target = if *path == config_dir {
            WatchTarget::ConfigDocument
        } else if *path == assets_dir {
            WatchTarget::CustomPage
        } else {
            continue;
        };
        if !dirs.iter().any(|(dir, _)| dir == path) {
            dirs.push((path.clone(), target));
        }
    }
    dirs
}

/// Reload targets touched by an event, without duplicates
pub fn classify(layout: &AgentLayout, event: &Event) -> Vec<WatchTarget> {
    if !is_relevant(&event.kind) {
        return Vec::new();
    }
    let config_file = layout.config_file();
    let config_dir = layout.config_dir();
    let page_file = layout.custom_page_file();
    let assets_dir = layout.assets_dir();

    let mut targets = Vec::new();
    for path in &event.paths {
        let target = if *path == config_file || *path == config_dir {
            WatchTarget::ConfigDocument
        } else if *path == page_file || *path == assets_dir {
            WatchTarget::CustomPage
        } else {
            continue;
        };
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}

// Create, delete, content and rename events; metadata and access are ignored
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
            | EventKind::Any
    )
}
