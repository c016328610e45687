//! Suggestion and Rewrite Payloads
//!
//! The structured results produced by the suggestion and rewrite engines and
//! carried inside `suggestion`-type analysis steps. Field names serialize in
//! camelCase to match the wire protocol consumed by the record UI.

use serde::{Deserialize, Serialize};

use crate::policy::ImprovementStyle;

/// A proposed value for one record field, produced by the suggestion engine.
///
/// Only surfaced when the model's confidence meets the field policy threshold
/// and the normalized suggested value differs from the normalized current
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSuggestion {
    /// Record field key this suggestion applies to.
    pub field: String,
    /// The value currently stored on the record, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    pub suggested_value: String,
    /// Model confidence, 0-100.
    pub confidence: u8,
    /// Brief model explanation for the suggestion.
    pub reasoning: String,
    /// True when the narrative text explicitly contradicts the current value
    /// (vs. filling a blank).
    pub is_discrepancy: bool,
    pub improvement_style: ImprovementStyle,
    /// Whether the field was blank when the suggestion was generated.
    pub is_empty: bool,
}

/// A rewritten execution-details text, produced by the rewrite engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    /// The narrative text as it stood before the rewrite.
    pub current_text: String,
    /// The proposed replacement, in constrained inline markup.
    pub rewritten_text: String,
    /// Short list of improvements the model claims to have made.
    pub improvements: Vec<String>,
    /// Model confidence, 0-100.
    pub confidence: u8,
}

/// Variation directive for an alternative rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteVariation {
    Concise,
    Detailed,
}

impl std::fmt::Display for RewriteVariation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriteVariation::Concise => write!(f, "concise"),
            RewriteVariation::Detailed => write!(f, "detailed"),
        }
    }
}

/// One surviving alternative rewrite, tagged with the variation that
/// produced it. Variants whose rendered text duplicates the primary rewrite
/// (or an earlier variant) are dropped before emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteVariant {
    pub variation: RewriteVariation,
    #[serde(flatten)]
    pub result: RewriteResult,
}
