//! Analysis Steps and Wire Protocol
//!
//! Progress events emitted by the orchestrator and the framed JSON messages
//! exchanged over the streaming transport. Steps are append-only: once
//! emitted they are never mutated, and the transport forwards them in
//! emission order, one frame per step.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::suggestion::{FieldSuggestion, RewriteResult, RewriteVariant};

/// Phase tag for an analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// A step has started doing work.
    Analysis,
    /// A step produced a payload for the user to review.
    Suggestion,
    /// A step (or the whole run) finished.
    Complete,
}

/// Payload attached to a `suggestion`-type step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepData {
    /// Field suggestions awaiting user resolution.
    Suggestions { suggestions: Vec<FieldSuggestion> },
    /// The primary rewrite plus surviving deduplicated variants.
    #[serde(rename_all = "camelCase")]
    Rewrite {
        execution_rewrite: RewriteResult,
        variants: Vec<RewriteVariant>,
    },
}

/// One progress record emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStep {
    pub step: u32,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StepData>,
}

impl AnalysisStep {
    /// A step has started.
    pub fn analysis(step: u32, message: impl Into<String>) -> Self {
        Self {
            step,
            step_type: StepType::Analysis,
            message: message.into(),
            data: None,
        }
    }

    /// A step finished with no payload.
    pub fn complete(step: u32, message: impl Into<String>) -> Self {
        Self {
            step,
            step_type: StepType::Complete,
            message: message.into(),
            data: None,
        }
    }

    /// A step produced a payload for review.
    pub fn suggestion(step: u32, message: impl Into<String>, data: StepData) -> Self {
        Self {
            step,
            step_type: StepType::Suggestion,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Inbound command from the remote client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Run the full analysis: field scan, suggestion fan-out, then (when no
    /// suggestions surface) the rewrite phase.
    #[serde(rename_all = "camelCase")]
    AnalyzeRecord {
        record_data: Record,
        /// Optional base64 display photos forwarded to the rewrite call.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        images: Vec<String>,
    },
    /// Run only the execution-details rewrite phase, e.g. after the user has
    /// resolved all outstanding field suggestions.
    #[serde(rename_all = "camelCase")]
    AnalyzeExecutionDetails {
        record_data: Record,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        images: Vec<String>,
    },
}

impl ClientCommand {
    /// Parse an inbound text frame. A frame that is valid JSON but not a
    /// known command shape is a parse error, not a serialization error, so
    /// the transport can report both identically.
    pub fn parse(text: &str) -> CoreResult<Self> {
        serde_json::from_str(text)
            .map_err(|err| CoreError::parse(format!("invalid command: {}", err)))
    }
}

/// Outbound event framed to the remote client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    AnalysisStep {
        step: u32,
        step_type: StepType,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<StepData>,
    },
    Error { message: String },
}

impl From<AnalysisStep> for ServerEvent {
    fn from(step: AnalysisStep) -> Self {
        ServerEvent::AnalysisStep {
            step: step.step,
            step_type: step.step_type,
            message: step.message,
            data: step.data,
        }
    }
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}
