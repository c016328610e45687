//! Field Suggestion Engine
//!
//! For a single record field, builds a context-aware prompt from the field
//! policy, invokes the LLM gateway, and validates the structured response
//! against the confidence threshold and the normalized-equality rule. Every
//! failure mode (gateway error, malformed output, threshold miss, no-op
//! suggestion) degrades to `None`; the engine never propagates errors to the
//! orchestrator.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use picos_core::{is_blank_value, normalize_value, FieldSuggestion, PolicyTable, Record};
use picos_llm::{GatewayRequest, LlmGateway};

use crate::services::prompts::{suggestion_prompt, system_prompt, SuggestionPromptContext};

/// Structured response requested from the model for a field suggestion.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct SuggestionResponse {
    has_suggestion: bool,
    suggested_value: Option<String>,
    confidence: f64,
    reasoning: String,
    is_discrepancy: bool,
}

/// Per-field suggestion engine. Pure function of its inputs apart from the
/// gateway round trip; safe to share across a run.
pub struct SuggestionEngine {
    gateway: Arc<dyn LlmGateway>,
    policies: Arc<PolicyTable>,
    default_threshold: u8,
}

impl SuggestionEngine {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        policies: Arc<PolicyTable>,
        default_threshold: u8,
    ) -> Self {
        Self {
            gateway,
            policies,
            default_threshold,
        }
    }

    /// JSON schema for the structured response.
    pub fn response_schema() -> serde_json::Value {
        schemars::schema_for!(SuggestionResponse).to_value()
    }

    /// Analyze one field against the record's execution text.
    ///
    /// Returns `None` without a gateway call when the execution text is
    /// blank (no suggestion can be grounded) or the field has no policy.
    pub async fn suggest(&self, field_key: &str, record: &Record) -> Option<FieldSuggestion> {
        let execution_text = record.execution_text();
        if is_blank_value(execution_text) {
            return None;
        }
        let Some(policy) = self.policies.get(field_key) else {
            tracing::warn!(field = field_key, "no policy configured; skipping field");
            return None;
        };

        let current = record.get(field_key);
        let has_current = current.map(|v| !is_blank_value(v)).unwrap_or(false);
        let record_context = record.context_lines();
        let ctx = SuggestionPromptContext {
            field_key,
            current_value: if has_current { current } else { None },
            policy,
            execution_text,
            record_context: &record_context,
        };

        let request = GatewayRequest::new(
            system_prompt(),
            suggestion_prompt(&ctx),
            Self::response_schema(),
        );
        let value = match self.gateway.invoke(request).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(field = field_key, error = %err, "field suggestion call failed");
                return None;
            }
        };

        // An empty object (malformed model output) deserializes to the
        // default response, i.e. hasSuggestion = false.
        let parsed: SuggestionResponse = match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(field = field_key, error = %err, "unusable suggestion payload");
                return None;
            }
        };

        if !parsed.has_suggestion {
            return None;
        }
        let suggested = parsed.suggested_value?;
        if is_blank_value(&suggested) {
            return None;
        }

        // Discard no-op "corrections" that restate the current value.
        let current_str = current.unwrap_or("");
        if normalize_value(current_str) == normalize_value(&suggested) {
            return None;
        }

        let confidence = parsed.confidence.round().clamp(0.0, 100.0) as u8;
        let threshold = policy.threshold(self.default_threshold);
        if confidence < threshold {
            tracing::debug!(
                field = field_key,
                confidence,
                threshold,
                "suggestion below field threshold"
            );
            return None;
        }

        Some(FieldSuggestion {
            field: field_key.to_string(),
            current_value: ctx.current_value.map(str::to_string),
            suggested_value: suggested,
            confidence,
            reasoning: parsed.reasoning,
            is_discrepancy: parsed.is_discrepancy,
            improvement_style: policy.improvement_style,
            is_empty: !has_current,
        })
    }
}
