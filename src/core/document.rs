//! Normalized YAML documents.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

/// A parsed configuration document with string-only mapping keys.
///
/// Mappings are kept sorted by key so that encoding the same document twice
/// always produces the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// An absent or explicit `null` value.
    Null,
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered list of values.
    Sequence(Vec<Document>),
    /// A string-keyed mapping.
    Mapping(BTreeMap<String, Document>),
}

/// Leaf values of a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// `true` / `false`
    Bool(bool),
    /// Integer or floating point number.
    Number(serde_yaml::Number),
    /// Any string.
    String(String),
}

impl Document {
    /// An empty mapping.
    pub fn empty_mapping() -> Self {
        Document::Mapping(BTreeMap::new())
    }

    /// Returns the mapping entries if this document is a mapping.
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key of a mapping document.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Whether this document is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Whether the document carries any configuration at all.
    ///
    /// `null`, empty collections, and blank strings count as empty.
    pub fn has_content(&self) -> bool {
        match self {
            Document::Null => false,
            Document::Mapping(map) => !map.is_empty(),
            Document::Sequence(items) => !items.is_empty(),
            Document::Scalar(Scalar::String(s)) => !s.trim().is_empty(),
            Document::Scalar(_) => true,
        }
    }

    /// Encode the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Encode`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ConfigError::Encode)
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Scalar(Scalar::Number(value.into()))
    }
}

/// Parse YAML bytes into a normalized [`Document`].
///
/// Empty input (no YAML document at all, e.g. blank or comment-only) yields
/// [`Document::Null`]. Only the first document of a multi-document stream is
/// used. Non-string mapping keys are converted to their canonical string form
/// and YAML tags are dropped.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the input is not valid YAML.
///
/// # Examples
///
/// ```rust
/// use golangcix::core::{normalize, Document};
///
/// let doc = normalize(b"linters:\n  disable: [gofmt]\n").unwrap();
/// assert!(doc.get("linters").is_some());
/// assert_eq!(normalize(b"").unwrap(), Document::Null);
/// ```
pub fn normalize(data: &[u8]) -> Result<Document> {
    if data.trim_ascii().is_empty() {
        return Ok(Document::Null);
    }

    let Some(first) = serde_yaml::Deserializer::from_slice(data).next() else {
        return Ok(Document::Null);
    };

    let value = YamlValue::deserialize(first).map_err(ConfigError::Parse)?;
    Ok(from_yaml_value(value))
}

/// Convert a raw `serde_yaml::Value` into a [`Document`].
fn from_yaml_value(value: YamlValue) -> Document {
    match value {
        YamlValue::Null => Document::Null,
        YamlValue::Bool(b) => Document::Scalar(Scalar::Bool(b)),
        YamlValue::Number(n) => Document::Scalar(Scalar::Number(n)),
        YamlValue::String(s) => Document::Scalar(Scalar::String(s)),
        YamlValue::Sequence(items) => {
            Document::Sequence(items.into_iter().map(from_yaml_value).collect())
        }
        YamlValue::Mapping(map) => {
            let mut result = BTreeMap::new();
            for (key, val) in map {
                result.insert(key_string(&key), from_yaml_value(val));
            }
            Document::Mapping(result)
        }
        YamlValue::Tagged(tagged) => from_yaml_value(tagged.value),
    }
}

/// Canonical string form of a mapping key.
fn key_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => key_string(&tagged.value),
        complex => serde_yaml::to_string(complex)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{complex:?}")),
    }
}
