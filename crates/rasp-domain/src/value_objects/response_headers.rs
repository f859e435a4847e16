//! Custom response headers injected into protected responses

use crate::constants::RESPONSE_HEADER_MAX_LEN;
use crate::error::{Error, Result};
use crate::value_objects::config_key::ConfigKey;
use crate::value_objects::config_value::ConfigValue;
use std::collections::BTreeMap;
use std::fmt;

/// Validated header name → value set
///
/// Built only through [`ResponseHeaders::try_from_section`], which validates
/// the whole section as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    headers: BTreeMap<String, String>,
}

impl ResponseHeaders {
    /// Empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a nested document section
    ///
    /// Values must be non-null scalars, and both name and rendered value must
    /// be 1 to 200 characters long. Any violation rejects the entire section.
    pub fn try_from_section(section: &BTreeMap<String, ConfigValue>) -> Result<Self> {
        let key = ConfigKey::ResponseHeaders.name();
        let mut headers = BTreeMap::new();
        for (name, value) in section {
            if matches!(value, ConfigValue::Null) {
                return Err(Error::validation(
                    key,
                    format!("the value of header {name:?} can not be null"),
                ));
            }
            let Some(text) = value.as_scalar_text() else {
                return Err(Error::validation(
                    key,
                    format!(
                        "the value of header {name:?} must be a primitive or string, not {}",
                        value.kind()
                    ),
                ));
            };
            check_length(key, "name", name)?;
            check_length(key, "value", &text)?;
            headers.insert(name.clone(), text);
        }
        Ok(Self { headers })
    }

    /// Look up a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if no headers are configured
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn check_length(key: &str, what: &str, text: &str) -> Result<()> {
    let len = text.chars().count();
    if len == 0 || len > RESPONSE_HEADER_MAX_LEN {
        return Err(Error::validation(
            key,
            format!("the length of a header {what} must be between [1,{RESPONSE_HEADER_MAX_LEN}]"),
        ));
    }
    Ok(())
}

impl fmt::Display for ResponseHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.headers)
    }
}
