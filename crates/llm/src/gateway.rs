//! LLM Gateway Trait
//!
//! Defines the common interface for all gateway implementations and the
//! shared HTTP/content error handling helpers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ollama::OllamaGateway;
use crate::openai::OpenAiGateway;
use crate::types::{GatewayConfig, GatewayProvider, GatewayRequest, LlmError, LlmResult};

/// Trait that all gateways implement.
///
/// One `invoke` is one independent round trip: the gateway holds no mutable
/// state across calls, so a single instance may be shared (`Arc`) across an
/// orchestrator run and invoked serially or concurrently as the caller's
/// concurrency cap allows.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Gateway name for logging and identification.
    fn name(&self) -> &'static str;

    /// The model this gateway targets.
    fn model(&self) -> &str;

    /// Get the configuration for this gateway.
    fn config(&self) -> &GatewayConfig;

    /// Send a structured request and return the model's output parsed into
    /// the requested schema shape.
    ///
    /// When the model returns content that is not valid JSON, the gateway
    /// returns an empty object rather than an error; callers must treat
    /// missing keys as "no suggestion" / "no rewrite".
    async fn invoke(&self, request: GatewayRequest) -> LlmResult<serde_json::Value>;

    /// Check that the backend is reachable (and, for API gateways, that the
    /// key is accepted).
    async fn health_check(&self) -> LlmResult<()>;
}

/// Build a gateway from configuration. Business logic selects behavior by
/// config here, never by branching on provider inside the engines.
pub fn build_gateway(config: &GatewayConfig) -> Arc<dyn LlmGateway> {
    match config.provider {
        GatewayProvider::Ollama => Arc::new(OllamaGateway::new(config.clone())),
        GatewayProvider::OpenAi => Arc::new(OpenAiGateway::new(config.clone())),
    }
}

/// Helper function to create an error for a missing API key.
pub fn missing_api_key_error(gateway: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", gateway),
    }
}

/// Helper function to map HTTP error status codes.
pub fn parse_http_error(status: u16, body: &str, gateway: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", gateway),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", gateway),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

/// Parse the model's message content as JSON. Structured-output modes still
/// occasionally yield truncated or non-JSON text; per the gateway contract
/// that degrades to an empty object, not an error.
pub(crate) fn parse_structured_content(content: &str, gateway: &str) -> serde_json::Value {
    match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                gateway,
                error = %err,
                "model returned non-JSON content; treating as empty output"
            );
            serde_json::Value::Object(serde_json::Map::new())
        }
    }
}
