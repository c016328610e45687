//! OpenAI-compatible Gateway
//!
//! Remote inference via an OpenAI-style chat completions API. Structured
//! output is requested through `response_format` with the caller's JSON
//! schema. Any endpoint speaking this dialect works via `base_url`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::gateway::{
    missing_api_key_error, parse_http_error, parse_structured_content, LlmGateway,
};
use crate::http_client::build_http_client;
use crate::types::{GatewayConfig, GatewayRequest, LlmError, LlmResult};

/// Default OpenAI API base.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible gateway for remote inference.
pub struct OpenAiGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiGateway {
    /// Create a new OpenAI gateway with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let client = build_http_client(config.timeout_secs);
        Self { config, client }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_API_BASE)
            .trim_end_matches('/')
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_api_key_error("openai"))
    }

    /// Build the chat completions request body.
    fn build_request_body(&self, request: &GatewayRequest) -> serde_json::Value {
        let user_content = if request.images.is_empty() {
            serde_json::json!(request.user_prompt)
        } else {
            // Multimodal content parts: text first, then data-URI images.
            let mut parts = vec![serde_json::json!({
                "type": "text",
                "text": request.user_prompt,
            })];
            for image in &request.images {
                parts.push(serde_json::json!({
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/png;base64,{}", image) },
                }));
            }
            serde_json::json!(parts)
        };

        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": user_content },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "analysis_response",
                    "schema": request.response_schema,
                },
            },
        })
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn invoke(&self, request: GatewayRequest) -> LlmResult<serde_json::Value> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url());
        let body = self.build_request_body(&request);

        tracing::debug!(model = %self.config.model, url = %url, "invoking chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &text, self.name()));
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|err| LlmError::InvalidResponse {
                message: format!("unexpected completion response shape: {}", err),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(parse_structured_content(&content, self.name()))
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self.api_key()?;
        let url = format!("{}/models", self.base_url());
        let response = self.client.get(&url).bearer_auth(api_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &text, self.name()));
        }
        Ok(())
    }
}
