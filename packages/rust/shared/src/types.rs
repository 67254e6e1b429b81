//! Core domain types for compiled dictionaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MorphDictError, Result};

/// Schema version of the compiled dictionary layout written by this tool.
pub const CURRENT_FORMAT_VERSION: &str = "1";

/// Metadata key naming the upstream snapshot a dictionary was compiled from.
pub const SOURCE_REVISION_KEY: &str = "source_revision";

// ---------------------------------------------------------------------------
// DictMeta
// ---------------------------------------------------------------------------

/// The `meta.json` mapping stored at the root of a compiled dictionary.
///
/// Values are strings or numbers; keys are kept sorted so that reports and
/// serialized output are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DictMeta(BTreeMap<String, serde_json::Value>);

impl DictMeta {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Value rendered as plain text: strings unquoted, numbers in decimal.
    ///
    /// Returns `None` for missing keys, empty strings, and non-scalar values.
    pub fn get_scalar(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The `source_revision` entry, required for version stamping.
    pub fn source_revision(&self) -> Result<String> {
        self.get_scalar(SOURCE_REVISION_KEY).ok_or_else(|| {
            MorphDictError::validation(format!(
                "compiled dictionary metadata has no usable '{SOURCE_REVISION_KEY}' entry"
            ))
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// One `key: value` line per entry, values aligned in a single column.
    pub fn summary_lines(&self) -> Vec<String> {
        let width = self.0.keys().map(String::len).max().unwrap_or(0);
        self.0
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let label = format!("{key}:");
                format!("{label:<pad$} {rendered}", pad = width + 1)
            })
            .collect()
    }
}

impl FromIterator<(String, serde_json::Value)> for DictMeta {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// VersionStamp
// ---------------------------------------------------------------------------

/// `"<format_version>.<source_revision>"` label for one compiled build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStamp {
    /// Layout version of the compiled dictionary.
    pub format_version: String,
    /// Upstream snapshot identifier.
    pub source_revision: String,
}

impl VersionStamp {
    /// Build a stamp from a format version and the dictionary's metadata.
    pub fn derive(format_version: &str, meta: &DictMeta) -> Result<Self> {
        Ok(Self {
            format_version: format_version.to_string(),
            source_revision: meta.source_revision()?,
        })
    }
}

impl std::fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.format_version, self.source_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_with(revision: serde_json::Value) -> DictMeta {
        let mut meta = DictMeta::new();
        meta.insert("format_version", "1");
        meta.insert(SOURCE_REVISION_KEY, revision);
        meta
    }

    #[test]
    fn stamp_from_string_revision() {
        let stamp = VersionStamp::derive("2", &meta_with("1234".into())).expect("derive");
        assert_eq!(stamp.to_string(), "2.1234");
    }

    #[test]
    fn stamp_from_numeric_revision() {
        let stamp = VersionStamp::derive("1", &meta_with(417127.into())).expect("derive");
        assert_eq!(stamp.to_string(), "1.417127");
    }

    #[test]
    fn missing_or_unusable_revision_is_rejected() {
        let mut meta = DictMeta::new();
        meta.insert("format_version", "1");
        let err = VersionStamp::derive("1", &meta).unwrap_err();
        assert!(err.to_string().contains("source_revision"));

        assert!(VersionStamp::derive("1", &meta_with("".into())).is_err());
        assert!(VersionStamp::derive("1", &meta_with(serde_json::Value::Null)).is_err());
        assert!(VersionStamp::derive("1", &meta_with(serde_json::json!(["1"]))).is_err());
    }

    #[test]
    fn meta_json_roundtrip_keeps_key_order() {
        let json = r#"{"source_revision": "417127", "compiled_at": "2026-10-16T00:00:00Z", "words_count": 5}"#;
        let meta: DictMeta = serde_json::from_str(json).expect("parse");
        let keys: Vec<_> = meta.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["compiled_at", "source_revision", "words_count"]);
        assert_eq!(meta.get_scalar("words_count").as_deref(), Some("5"));
    }

    #[test]
    fn summary_lines_are_aligned() {
        let meta: DictMeta = [
            ("source".to_string(), serde_json::json!("opencorpora.org")),
            ("words_count".to_string(), serde_json::json!(12)),
        ]
        .into_iter()
        .collect();

        let lines = meta.summary_lines();
        assert_eq!(lines, vec!["source:      opencorpora.org", "words_count: 12"]);
    }
}
