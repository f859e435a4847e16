//! Custom response page
//!
//! The HTML snippet injected into responses, read from `assets/inject.html`.
//! Readers get the current page without locking; reloads swap it whole.

use arc_swap::ArcSwapOption;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Holder of the current custom response page
#[derive(Debug)]
pub struct CustomResponsePage {
    path: PathBuf,
    page: ArcSwapOption<String>,
}

impl CustomResponsePage {
    /// Empty holder for the page at `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            page: ArcSwapOption::empty(),
        }
    }

    /// (Re)read the page; returns whether one is present afterwards
    ///
    /// A missing or unreadable file clears the page.
    pub fn load(&self) -> bool {
        if !self.path.is_file() {
            self.page.store(None);
            info!("custom response page {} not found", self.path.display());
            return false;
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                info!("custom response page loaded from {}", self.path.display());
                self.page.store(Some(Arc::new(content)));
                true
            }
            Err(e) => {
                warn!(
                    "failed to read custom response page {}: {}",
                    self.path.display(),
                    e
                );
                self.page.store(None);
                false
            }
        }
    }

    /// Current page content
    pub fn get(&self) -> Option<Arc<String>> {
        self.page.load_full()
    }

    /// File the page is read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}
