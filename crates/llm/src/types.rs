//! Gateway Types
//!
//! Configuration, request, and error types shared by all gateway
//! implementations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported gateway backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProvider {
    /// Local inference via an Ollama server.
    Ollama,
    /// Remote inference via an OpenAI-compatible chat completions API.
    OpenAi,
}

impl std::fmt::Display for GatewayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayProvider::Ollama => write!(f, "ollama"),
            GatewayProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Configuration for a gateway instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Which backend to talk to.
    pub provider: GatewayProvider,
    /// Model name to use.
    pub model: String,
    /// Base URL override (optional; each provider has a sane default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key (not needed for Ollama).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: GatewayProvider::Ollama,
            model: "gemma3:12b".to_string(),
            base_url: None,
            api_key: None,
            max_tokens: 1024,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// One structured round trip to the model.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Base64-encoded image payloads attached to the user message.
    pub images: Vec<String>,
    /// JSON schema the model output must conform to.
    pub response_schema: serde_json::Value,
}

impl GatewayRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        response_schema: serde_json::Value,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            images: Vec::new(),
            response_schema,
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Errors from gateway calls. Engines treat every variant as "no actionable
/// output" for the affected call; nothing here aborts an orchestrator run.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Server error ({status:?}): {message}")]
    ServerError { message: String, status: Option<u16> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("{message}")]
    Other { message: String },
}

/// Result type alias for gateway calls.
pub type LlmResult<T> = Result<T, LlmError>;
