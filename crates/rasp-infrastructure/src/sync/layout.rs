//! On-disk agent layout

use crate::constants::*;
use std::path::{Path, PathBuf};

/// Paths the engine reads and watches, all under one base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLayout {
    base_dir: PathBuf,
}

impl AgentLayout {
    /// Layout rooted at `base_dir`
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Same layout with an absolute, symlink-free base directory
    ///
    /// Watch events report resolved paths, so the watcher compares against
    /// this form. Falls back to the given path if it cannot be resolved.
    pub fn canonicalized(&self) -> Self {
        match std::fs::canonicalize(&self.base_dir) {
            Ok(base_dir) => Self { base_dir },
            Err(_) => self.clone(),
        }
    }

    /// Base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base>/conf`
    pub fn config_dir(&self) -> PathBuf {
        self.base_dir.join(CONFIG_DIR_NAME)
    }

    /// `<base>/conf/openrasp.yml`
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE_NAME)
    }

    /// `<base>/assets`
    pub fn assets_dir(&self) -> PathBuf {
        self.base_dir.join(CUSTOM_RESPONSE_DIR_NAME)
    }

    /// `<base>/assets/inject.html`
    pub fn custom_page_file(&self) -> PathBuf {
        self.assets_dir().join(CUSTOM_RESPONSE_FILE_NAME)
    }

    /// Directories registered with the filesystem watcher
    pub fn watched_dirs(&self) -> [PathBuf; 3] {
        [self.base_dir.clone(), self.config_dir(), self.assets_dir()]
    }
}
