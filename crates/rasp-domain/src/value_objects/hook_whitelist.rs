//! Hook whitelist: which checks are suppressed at which hook points
//!
//! Document form:
//!
//! ```yaml
//! hook.white:
//!   "*": ["sqli"]            # every hook point
//!   "sql": ["all"]           # every check at the sql hook point
//!   "command": ["command", "ssrf"]
//! ```
//!
//! A wildcard entry containing `all` replaces the entire whitelist with a
//! single global entry and discards everything else in the same section.

use crate::constants::{HOOK_ALL_CHECKS, HOOK_GLOBAL_KEY, HOOK_WILDCARD};
use crate::value_objects::check_type::CheckType;
use crate::value_objects::config_value::ConfigValue;
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from hook point (or `""` for every hook) to a suppression mask
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookWhitelist {
    entries: BTreeMap<String, u32>,
}

impl HookWhitelist {
    /// Empty whitelist (nothing suppressed)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the nested whitelist section
    ///
    /// Entries whose value is not a list are ignored, unknown check names are
    /// skipped silently.
    pub fn parse(section: &BTreeMap<String, ConfigValue>) -> Self {
        let mut entries = BTreeMap::new();
        for (hook, value) in section {
            let Some(items) = value.as_list() else {
                continue;
            };
            let names: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    ConfigValue::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            let wants_all = names.contains(&HOOK_ALL_CHECKS);

            if hook == HOOK_WILDCARD && wants_all {
                let mut global = BTreeMap::new();
                global.insert(HOOK_GLOBAL_KEY.to_string(), CheckType::all_mask());
                return Self { entries: global };
            }

            let mask = if wants_all {
                CheckType::all_mask()
            } else {
                names
                    .iter()
                    .filter_map(|name| CheckType::from_name(name))
                    .map(CheckType::code)
                    .sum()
            };
            let key = if hook == HOOK_WILDCARD {
                HOOK_GLOBAL_KEY
            } else {
                hook.as_str()
            };
            entries.insert(key.to_string(), mask);
        }
        Self { entries }
    }

    /// Suppression mask stored for a hook point (`""` for the global entry)
    pub fn mask(&self, hook: &str) -> Option<u32> {
        self.entries.get(hook).copied()
    }

    /// Whether `check` is suppressed at `hook`, through its own entry or the global one
    pub fn is_suppressed(&self, hook: &str, check: CheckType) -> bool {
        let code = check.code();
        if code == 0 {
            return false;
        }
        let global = self.mask(HOOK_GLOBAL_KEY).unwrap_or(0);
        let local = self.mask(hook).unwrap_or(0);
        (global | local) & code != 0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is whitelisted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(hook, mask)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for HookWhitelist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.entries)
    }
}
