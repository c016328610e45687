//! Ollama Gateway
//!
//! Local inference via an Ollama server's `/api/chat` endpoint. Structured
//! output is requested by passing the response schema in the `format` field;
//! Ollama constrains generation to the schema server-side.

use async_trait::async_trait;
use serde::Deserialize;

use crate::gateway::{parse_http_error, parse_structured_content, LlmGateway};
use crate::http_client::build_http_client;
use crate::types::{GatewayConfig, GatewayRequest, LlmError, LlmResult};

/// Default Ollama API endpoint.
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Ollama gateway for local inference.
pub struct OllamaGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

/// Response shape for a non-streaming `/api/chat` call.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaGateway {
    /// Create a new Ollama gateway with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let client = build_http_client(config.timeout_secs);
        Self { config, client }
    }

    /// Get the server base URL.
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OLLAMA_DEFAULT_URL)
    }

    /// Build the request body for `/api/chat`.
    fn build_request_body(&self, request: &GatewayRequest) -> serde_json::Value {
        let mut user_message = serde_json::json!({
            "role": "user",
            "content": request.user_prompt,
        });
        if !request.images.is_empty() {
            user_message["images"] = serde_json::json!(request.images);
        }

        serde_json::json!({
            "model": self.config.model,
            "stream": false,
            "format": request.response_schema,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                user_message,
            ],
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn invoke(&self, request: GatewayRequest) -> LlmResult<serde_json::Value> {
        let url = format!("{}/api/chat", self.base_url());
        let body = self.build_request_body(&request);

        tracing::debug!(model = %self.config.model, url = %url, "invoking ollama chat");

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &text, self.name()));
        }

        let parsed: OllamaChatResponse =
            response.json().await.map_err(|err| LlmError::InvalidResponse {
                message: format!("unexpected chat response shape: {}", err),
            })?;

        Ok(parse_structured_content(&parsed.message.content, self.name()))
    }

    async fn health_check(&self) -> LlmResult<()> {
        let url = format!("{}/api/tags", self.base_url());
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &text, self.name()));
        }
        Ok(())
    }
}
