//! Application Configuration
//!
//! Loads the server configuration from a TOML file, filling missing sections
//! with defaults and validating thresholds on load. Thresholds are
//! configuration, not load-bearing constants: the 90 gate for auto-surfaced
//! field suggestions and the 60 gate for rewrites can both be tuned without
//! touching the orchestrator.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use picos_llm::GatewayConfig;

use crate::utils::error::{AppError, AppResult};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub analysis: AnalysisConfig,
}

/// Listener and streaming pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Cosmetic delay between forwarded step frames, in milliseconds.
    pub step_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            step_delay_ms: 1000,
        }
    }
}

/// Analysis thresholds and fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum confidence for a field suggestion to be auto-surfaced by the
    /// orchestrator (stricter than the per-field engine threshold).
    pub auto_surface_threshold: u8,
    /// Default per-field engine threshold when the policy has none.
    pub default_field_threshold: u8,
    /// Minimum confidence for an accepted rewrite.
    pub rewrite_min_confidence: u8,
    /// Confidence assigned to the degraded rewrite fallback.
    pub rewrite_fallback_confidence: u8,
    /// Character budget for rendered rewrite text (markup excluded).
    pub char_budget: usize,
    /// Maximum in-flight LLM calls during fan-out. 1 serializes calls to
    /// avoid overwhelming the model-serving backend.
    pub concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            auto_surface_threshold: 90,
            default_field_threshold: 60,
            rewrite_min_confidence: 60,
            rewrite_fallback_confidence: 50,
            char_budget: 265,
            concurrency: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// a malformed or invalid file is an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate threshold ranges and fan-out settings.
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("auto_surface_threshold", self.analysis.auto_surface_threshold),
            ("default_field_threshold", self.analysis.default_field_threshold),
            ("rewrite_min_confidence", self.analysis.rewrite_min_confidence),
            (
                "rewrite_fallback_confidence",
                self.analysis.rewrite_fallback_confidence,
            ),
        ] {
            if value > 100 {
                return Err(AppError::validation(format!(
                    "{} must be within 0-100, got {}",
                    name, value
                )));
            }
        }
        if self.analysis.concurrency == 0 {
            return Err(AppError::validation("concurrency must be at least 1"));
        }
        if self.analysis.char_budget == 0 {
            return Err(AppError::validation("char_budget must be positive"));
        }
        if self.gateway.model.trim().is_empty() {
            return Err(AppError::config("gateway model must be set"));
        }
        Ok(())
    }

    /// Listener bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
