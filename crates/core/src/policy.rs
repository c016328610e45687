//! Field Policies
//!
//! Per-field configuration describing how the suggestion engine treats each
//! analyzable record field: the allowed value set (if the field is a
//! picklist), whether the model should flag literal contradictions or propose
//! improvements, the confidence threshold, and free-form guidance injected
//! into the prompt. Policies are data, not code branches, so new fields can
//! be added without touching the orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// How the model should treat a field during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementStyle {
    /// Flag the field only when the narrative text explicitly contradicts it.
    Literal,
    /// Propose an improved value when the current one is missing or weak.
    Suggestive,
}

impl std::fmt::Display for ImprovementStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImprovementStyle::Literal => write!(f, "literal"),
            ImprovementStyle::Suggestive => write!(f, "suggestive"),
        }
    }
}

/// Configuration for one analyzable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPolicy {
    /// Allowed values when the field is a constrained picklist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Literal (contradictions only) vs. suggestive (improvements).
    pub improvement_style: ImprovementStyle,
    /// Minimum confidence for the engine to surface a suggestion.
    /// None falls back to the configured default (60 unless overridden).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<u8>,
    /// Free-form domain guidance appended to the prompt for this field.
    #[serde(default)]
    pub guidance: String,
}

impl FieldPolicy {
    /// Effective threshold for this field.
    pub fn threshold(&self, default: u8) -> u8 {
        self.confidence_threshold.unwrap_or(default)
    }
}

/// The static mapping from field key to policy, plus the ordered list of
/// fields the orchestrator scans. Iteration order of the scan list is the
/// emission order of field suggestions.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: BTreeMap<String, FieldPolicy>,
    scan_order: Vec<String>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy and add the field to the scan list.
    /// Rejects thresholds above 100 since confidence is a 0-100 scale.
    pub fn insert(&mut self, key: impl Into<String>, policy: FieldPolicy) -> CoreResult<()> {
        if let Some(threshold) = policy.confidence_threshold {
            if threshold > 100 {
                return Err(CoreError::validation(format!(
                    "confidence threshold {} exceeds 100",
                    threshold
                )));
            }
        }
        self.set(key.into(), policy);
        Ok(())
    }

    /// Register an already-validated policy.
    fn set(&mut self, key: String, policy: FieldPolicy) {
        debug_assert!(policy.confidence_threshold.unwrap_or(0) <= 100);
        if !self.scan_order.contains(&key) {
            self.scan_order.push(key.clone());
        }
        self.policies.insert(key, policy);
    }

    pub fn get(&self, key: &str) -> Option<&FieldPolicy> {
        self.policies.get(key)
    }

    /// Field keys the orchestrator analyzes, in scan order.
    pub fn scan_fields(&self) -> &[String] {
        &self.scan_order
    }

    pub fn len(&self) -> usize {
        self.scan_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scan_order.is_empty()
    }

    /// The standard PicOS activity policy table.
    ///
    /// Picklist fields carry their Salesforce option sets and use the
    /// literal style (the narrative text is ground truth, so only explicit
    /// contradictions are flagged). Free-text fields use the suggestive
    /// style. Activity type gets a stricter threshold since a wrong verb
    /// changes how front-line sales reads the whole activity.
    pub fn standard() -> Self {
        let mut table = Self::new();
        let entries = [
            (
                "Activity_type__c",
                FieldPolicy {
                    options: Some(string_vec(&["Execute", "Sell", "Hunt", "Verify"])),
                    improvement_style: ImprovementStyle::Literal,
                    confidence_threshold: Some(90),
                    guidance: "The activity type is the leading verb of the execution \
                               details. \"Execute\" maps to Headquarter Mandated (HQM) \
                               and \"Sell\" to Local Sell In (LSI)."
                        .to_string(),
                },
            ),
            (
                "POI_Picklist__c",
                FieldPolicy {
                    options: Some(string_vec(&[
                        "Front of store/Lobby",
                        "Perimeter",
                        "Beverage Aisle",
                        "Checkout",
                        "Cold Vault",
                    ])),
                    improvement_style: ImprovementStyle::Literal,
                    confidence_threshold: None,
                    guidance: "The point of interest is where the display physically \
                               stands in the store."
                        .to_string(),
                },
            ),
            (
                "Channel_Picklist__c",
                FieldPolicy {
                    options: Some(string_vec(&[
                        "Large Store",
                        "Small Store",
                        "Drug",
                        "Value",
                        "Convenience Retail",
                    ])),
                    improvement_style: ImprovementStyle::Literal,
                    confidence_threshold: None,
                    guidance: "The channel describes the retail format, not the \
                               location inside the store."
                        .to_string(),
                },
            ),
            (
                "Pricing__c",
                FieldPolicy {
                    options: None,
                    improvement_style: ImprovementStyle::Suggestive,
                    confidence_threshold: None,
                    guidance: "Pricing should capture the promoted price point exactly \
                               as written in the execution details, e.g. \"2/$4\" or \
                               \"$4.99\"."
                        .to_string(),
                },
            ),
            (
                "Promo_Offer__c",
                FieldPolicy {
                    options: None,
                    improvement_style: ImprovementStyle::Suggestive,
                    confidence_threshold: None,
                    guidance: "The promo offer is the consumer-facing deal mechanic \
                               (e.g. \"Simple Promo: 1 can for $4.99\")."
                        .to_string(),
                },
            ),
            (
                "Package_Detail__c",
                FieldPolicy {
                    options: None,
                    improvement_style: ImprovementStyle::Suggestive,
                    confidence_threshold: None,
                    guidance: "Package detail names the product/package being displayed \
                               (e.g. \"12-pack Core CAN\"). Prefer the phrasing used in \
                               the execution details."
                        .to_string(),
                },
            ),
        ];
        for (key, policy) in entries {
            table.set(key.to_string(), policy);
        }
        table
    }
}

fn string_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
