//! Local configuration document
//!
//! Reads the YAML document under `<base>/conf/` and converts it into the tagged
//! raw map the store consumes. A missing file is not an error; a malformed one
//! is a `DocumentParse` error that callers downgrade to a full-default load.

use crate::error_ext::ErrorContext;
use rasp_domain::error::{Error, Result};
use rasp_domain::value_objects::{ConfigValue, RawConfigMap};
use serde_yaml::Value;
use std::path::Path;

/// Read and parse the document at `path`
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_document(path: &Path) -> Result<Option<RawConfigMap>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .io_context(format!("Failed to read {}", path.display()))?;
    parse_document(&text).map(Some)
}

/// Parse document text
///
/// An empty document yields an empty map.
pub fn parse_document(text: &str) -> Result<RawConfigMap> {
    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| Error::document_parse_with_source(format!("invalid YAML: {}", e), e))?;
    match from_yaml(value) {
        ConfigValue::Null => Ok(RawConfigMap::new()),
        ConfigValue::Map(map) => Ok(map),
        other => Err(Error::document_parse(format!(
            "top level must be a mapping, found {}",
            other.kind()
        ))),
    }
}

/// Convert a YAML value into the tagged form
pub fn from_yaml(value: Value) -> ConfigValue {
    match value {
        Value::Null => ConfigValue::Null,
        Value::Bool(b) => ConfigValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ConfigValue::Int(i),
            None => ConfigValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => ConfigValue::Str(s),
        Value::Sequence(items) => ConfigValue::List(items.into_iter().map(from_yaml).collect()),
        Value::Mapping(mapping) => ConfigValue::Map(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(k), from_yaml(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

// Non-string keys (numbers, booleans) keep their scalar text
fn yaml_key(key: Value) -> String {
    match from_yaml(key) {
        ConfigValue::Null => String::new(),
        other => other.to_string(),
    }
}
