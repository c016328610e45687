//! PicOS LLM Gateway
//!
//! A thin adapter over model-serving endpoints. The gateway sends a
//! structured request (system prompt, user prompt, optional images, response
//! schema) and returns the model's output parsed into a JSON value. Two
//! interchangeable implementations are selected by configuration:
//! - Ollama (local inference)
//! - OpenAI-compatible chat completions (remote inference)
//!
//! The gateway does no caching and no retry: a malformed model response
//! degrades to an empty JSON object, and transport failures surface as
//! `LlmError` values the calling engines treat as "no actionable output".

pub mod gateway;
pub mod http_client;
pub mod ollama;
pub mod openai;
pub mod types;

pub use gateway::{build_gateway, missing_api_key_error, parse_http_error, LlmGateway};
pub use http_client::build_http_client;
pub use ollama::OllamaGateway;
pub use openai::OpenAiGateway;
pub use types::{GatewayConfig, GatewayProvider, GatewayRequest, LlmError, LlmResult};
