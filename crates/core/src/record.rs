//! Record Model
//!
//! A PicOS record is a flat mapping from Salesforce-style field keys to
//! string values, describing one merchandising activity. The record is owned
//! by the caller (UI session); the orchestrator receives it by value per run
//! and never mutates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field key holding the free-form narrative execution text. This field is
/// the grounding source of truth for every field suggestion and rewrite.
pub const EXECUTION_TEXT_FIELD: &str = "Product_Price_Execution_Direction__c";

/// Field key holding the activity type ("Execute", "Sell", "Hunt", "Verify").
/// The rewrite markup contract highlights this keyword.
pub const ACTIVITY_TYPE_FIELD: &str = "Activity_type__c";

/// Returns true when a field value counts as missing. Upstream form layers
/// sometimes persist the literal strings "undefined" or "null", so those are
/// treated as blank too.
pub fn is_blank_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "undefined" || trimmed == "null"
}

/// Normalize a field value for equality comparison: trim + lowercase.
/// Used to discard no-op suggestions where the model restates the current
/// value with different casing or whitespace.
pub fn normalize_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// One merchandising activity record: field key -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from key/value pairs. Mainly useful in tests and
    /// sample data.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Whether the field is absent or blank per [`is_blank_value`].
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).map(is_blank_value).unwrap_or(true)
    }

    /// The narrative execution text, or "" when unset.
    pub fn execution_text(&self) -> &str {
        self.get(EXECUTION_TEXT_FIELD).unwrap_or("")
    }

    /// The activity type value, or "" when unset.
    pub fn activity_type(&self) -> &str {
        self.get(ACTIVITY_TYPE_FIELD).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the record as "- key: value" lines for prompt context.
    /// Blank values are rendered as "Not specified" so the model sees which
    /// fields exist but carry no data.
    pub fn context_lines(&self) -> String {
        self.fields
            .iter()
            .map(|(key, value)| {
                if is_blank_value(value) {
                    format!("- {}: Not specified", key)
                } else {
                    format!("- {}: {}", key, value)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
