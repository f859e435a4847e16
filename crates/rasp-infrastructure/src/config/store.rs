//! Configuration store
//!
//! Holds the published [`ConfigSnapshot`] behind an `ArcSwap`. Readers load it
//! lock-free; writers serialize on one mutex, build the next snapshot from a
//! copy of the current one and publish it once per bulk load or single write.
//!
//! Failure policy per source:
//!
//! | Source | Rejected value |
//! |--------|----------------|
//! | File | previous value retained |
//! | Cloud | key default applied (header set: previous set retained) |
//! | Runtime | previous value retained, `false` returned |

use super::setters::{self, SetterContext};
use crate::logging::{log_key_applied, log_key_rejected, log_key_unchanged};
use arc_swap::{ArcSwap, Guard};
use rasp_domain::error::{Error, Result};
use rasp_domain::ports::DependentCache;
use rasp_domain::value_objects::{ConfigKey, ConfigSnapshot, ConfigValue, RawConfigMap};
use rasp_domain::ConfigSource;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Outcome of one store write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Origin of the values
    pub source: ConfigSource,
    /// Generation of the snapshot published by this write
    pub generation: u64,
    /// Keys whose value changed
    pub changed: Vec<ConfigKey>,
    /// Keys whose value was rejected
    pub rejected: Vec<ConfigKey>,
    /// Names present in the input that are not declared keys
    pub unknown: Vec<String>,
}

impl LoadReport {
    fn new(source: ConfigSource) -> Self {
        Self {
            source,
            generation: 0,
            changed: Vec::new(),
            rejected: Vec::new(),
            unknown: Vec::new(),
        }
    }

    /// Names of rejected keys
    pub fn rejected_names(&self) -> Vec<String> {
        self.rejected.iter().map(|k| k.name().to_string()).collect()
    }
}

/// The dynamic configuration store
pub struct ConfigStore {
    current: ArcSwap<ConfigSnapshot>,
    write_lock: Mutex<()>,
    cache: Arc<dyn DependentCache>,
}

impl ConfigStore {
    /// Create a store holding the defaults
    ///
    /// The dependent cache is shaped to the default `lru.max_size`.
    pub fn new(cache: Arc<dyn DependentCache>) -> Self {
        let defaults = ConfigSnapshot::default();
        cache.recreate(u64::from(defaults.lru_max_size));
        Self {
            current: ArcSwap::from_pointee(defaults),
            write_lock: Mutex::new(()),
            cache,
        }
    }

    /// Current snapshot, owned
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Current snapshot, borrowed for a short hot-path read
    pub fn load(&self) -> Guard<Arc<ConfigSnapshot>> {
        self.current.load()
    }

    /// The dependent cache this store reshapes
    pub fn cache(&self) -> &Arc<dyn DependentCache> {
        &self.cache
    }

    /// Bulk load from the local document
    ///
    /// `None` (missing or unparseable document) loads every key's default.
    /// Rejected values keep the previous value. Keys the document may not set
    /// are left untouched.
    pub fn load_from_file(&self, document: Option<&RawConfigMap>, is_init: bool) -> LoadReport {
        let source = ConfigSource::File;
        let mut report = LoadReport::new(source);
        let generation = self.write(|store, draft| {
            for &key in ConfigKey::ALL {
                if !key.file_sourceable() {
                    continue;
                }
                let raw = document.and_then(|d| lookup(d, key));
                match store.apply_value(draft, key, raw, is_init) {
                    Ok(changed) => {
                        if changed || is_init {
                            log_key_applied(key.name(), &draft.value_text(key), source, is_init);
                        } else {
                            log_key_unchanged(key.name(), source);
                        }
                        if changed {
                            report.changed.push(key);
                        }
                    }
                    Err(e) => {
                        log_key_rejected(
                            key.name(),
                            &describe(raw, key),
                            source,
                            &e.to_string(),
                            "retaining previous value",
                        );
                        report.rejected.push(key);
                    }
                }
            }
            if let Some(document) = document {
                report.unknown = unknown_names(document);
            }
            true
        });
        for name in &report.unknown {
            warn!(source = %source, "configuration item \"{}\" doesn't exist", name);
        }
        report.generation = generation;
        report
    }

    /// Bulk load from a remote configuration map
    ///
    /// Bootstrap-only keys are skipped. Rejected values fall back to the key
    /// default so the agent converges on a known state, except a rejected
    /// header set, which keeps the previous one.
    pub fn load_from_cloud(&self, config: &RawConfigMap) -> LoadReport {
        let source = ConfigSource::Cloud;
        let mut report = LoadReport::new(source);
        let generation = self.write(|store, draft| {
            for &key in ConfigKey::ALL {
                if key.bootstrap_only() {
                    if config.contains_key(key.name()) {
                        debug!(key = key.name(), "ignoring bootstrap-only key from remote source");
                    }
                    continue;
                }
                let raw = lookup(config, key);
                match store.apply_value(draft, key, raw, false) {
                    Ok(true) => {
                        log_key_applied(key.name(), &draft.value_text(key), source, false);
                        report.changed.push(key);
                    }
                    Ok(false) => log_key_unchanged(key.name(), source),
                    // Header updates are all-or-nothing on every source
                    Err(e) if key == ConfigKey::ResponseHeaders => {
                        log_key_rejected(
                            key.name(),
                            &describe(raw, key),
                            source,
                            &e.to_string(),
                            "retaining previous header set",
                        );
                        report.rejected.push(key);
                    }
                    Err(e) => {
                        let fallback = format!("using default value \"{}\"", key.default_value());
                        log_key_rejected(key.name(), &describe(raw, key), source, &e.to_string(), &fallback);
                        report.rejected.push(key);
                        match store.apply_value(draft, key, None, false) {
                            Ok(true) => report.changed.push(key),
                            Ok(false) => {}
                            Err(e) => error!(key = key.name(), error = %e, "default value rejected"),
                        }
                    }
                }
            }
            report.unknown = unknown_names(config);
            true
        });
        for name in &report.unknown {
            warn!(source = %source, "configuration item \"{}\" doesn't exist", name);
        }
        report.generation = generation;
        report
    }

    /// Set one key from its text form
    ///
    /// Returns false for undeclared keys, bootstrap-only keys and rejected
    /// values; the previous value stays in place.
    pub fn set_config(&self, name: &str, value: &str, is_init: bool) -> bool {
        let source = ConfigSource::Runtime;
        let Some(key) = ConfigKey::from_name(name) else {
            info!("configuration item \"{}\" doesn't exist", name);
            return false;
        };
        if key.bootstrap_only() {
            log_key_rejected(
                name,
                value,
                source,
                "key can only be set by the local document",
                "retaining previous value",
            );
            return false;
        }
        let mut accepted = false;
        self.write(|store, draft| {
            let before = draft.clone();
            let result = setters::setter_for(key).and_then(|apply| {
                let mut ctx = SetterContext {
                    draft: &mut *draft,
                    cache: store.cache.as_ref(),
                    is_init,
                };
                apply(&mut ctx, value)
            });
            match result {
                Ok(()) => {
                    accepted = true;
                    if *draft != before || is_init {
                        log_key_applied(name, &draft.value_text(key), source, is_init);
                    } else {
                        log_key_unchanged(name, source);
                    }
                }
                Err(e) => {
                    log_key_rejected(name, value, source, &e.to_string(), "retaining previous value")
                }
            }
            accepted
        });
        accepted
    }

    /// Boot-time invariant check
    ///
    /// Fails with `CriticalBoot` when `rasp.id` is present but malformed.
    pub fn check_major_config(&self) -> Result<()> {
        setters::validate_rasp_id(&self.current.load().rasp_id)
    }

    // Serialize writers and hand the closure a draft; publish it if asked to
    fn write<F>(&self, f: F) -> u64
    where
        F: FnOnce(&Self, &mut ConfigSnapshot) -> bool,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut draft = ConfigSnapshot::clone(&self.current.load());
        if !f(self, &mut draft) {
            return self.current.load().generation;
        }
        draft.generation += 1;
        let generation = draft.generation;
        self.current.store(Arc::new(draft));
        generation
    }

    // Apply one raw value (or the default when absent); Ok(true) if it changed
    fn apply_value(
        &self,
        draft: &mut ConfigSnapshot,
        key: ConfigKey,
        raw: Option<&ConfigValue>,
        is_init: bool,
    ) -> Result<bool> {
        let before = comparable(draft, key);
        let mut ctx = SetterContext {
            draft,
            cache: self.cache.as_ref(),
            is_init,
        };
        match raw {
            Some(value) if key.is_structured() => setters::apply_structured(&mut ctx, key, value)?,
            Some(value) => {
                if !value.is_scalar() && key != ConfigKey::AlgorithmConfig {
                    return Err(Error::validation(
                        key.name(),
                        format!("expected a scalar, found {}", value.kind()),
                    ));
                }
                let text = value.to_setter_text().unwrap_or_default();
                setters::setter_for(key)?(&mut ctx, &text)?;
            }
            None => setters::setter_for(key)?(&mut ctx, key.default_value())?,
        }
        Ok(before != comparable(ctx.draft, key))
    }
}

// value_text masks the secret, so compare it directly
fn comparable(draft: &ConfigSnapshot, key: ConfigKey) -> String {
    if key == ConfigKey::CloudAppSecret {
        draft.cloud_app_secret.clone()
    } else {
        draft.value_text(key)
    }
}

// Null counts as absent
fn lookup(map: &RawConfigMap, key: ConfigKey) -> Option<&ConfigValue> {
    map.get(key.name()).filter(|v| !matches!(v, ConfigValue::Null))
}

fn describe(raw: Option<&ConfigValue>, key: ConfigKey) -> String {
    if key == ConfigKey::CloudAppSecret {
        return "******".to_string();
    }
    raw.map_or_else(|| key.default_value().to_string(), ToString::to_string)
}

fn unknown_names(map: &RawConfigMap) -> Vec<String> {
    map.keys()
        .filter(|name| ConfigKey::from_name(name).is_none())
        .cloned()
        .collect()
}
