//! Agent settings loader
//!
//! Settings sources are merged in this order (later sources override earlier):
//! 1. Default values from `AgentSettings::default()`
//! 2. TOML settings file (if given and present)
//! 3. Environment variables with prefix (e.g., `RASP_BASE_DIR`, `RASP_LOGGING__LEVEL`)

use crate::constants::*;
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use crate::settings::AgentSettings;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rasp_domain::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Agent settings loader
#[derive(Clone)]
pub struct SettingsLoader {
    /// Settings file path
    settings_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl SettingsLoader {
    /// Create a new settings loader with default settings
    pub fn new() -> Self {
        Self {
            settings_path: None,
            env_prefix: SETTINGS_ENV_PREFIX.to_string(),
        }
    }

    /// Set the settings file path
    pub fn with_settings_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load settings from all sources
    pub fn load(&self) -> Result<AgentSettings> {
        let mut figment = Figment::new().merge(Serialized::defaults(AgentSettings::default()));

        let path = self
            .settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILENAME));
        if path.exists() {
            figment = figment.merge(Toml::file(&path));
            log_config_loaded(&path, true);
        } else if self.settings_path.is_some() {
            log_config_loaded(&path, false);
        }

        // Double underscore separates nested keys (RASP_LOGGING__LEVEL)
        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"));

        let settings: AgentSettings = figment
            .extract()
            .config_context("Failed to extract agent settings")?;

        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Get the settings file path, if one was set
    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_settings(settings: &AgentSettings) -> Result<()> {
    if settings.base_dir.as_os_str().is_empty() {
        return Err(Error::configuration("Agent base directory cannot be empty"));
    }
    parse_log_level(&settings.logging.level)?;
    if settings.remote.timeout_secs == 0 {
        return Err(Error::configuration(
            "Remote request timeout cannot be 0",
        ));
    }
    Ok(())
}
