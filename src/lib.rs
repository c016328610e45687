//! PicOS Analysis Server - Backend Library
//!
//! Streaming analysis service for PicOS merchandising records. It includes:
//! - Field suggestion and execution-text rewrite engines
//! - The step-based analysis orchestrator
//! - The WebSocket transport adapter
//! - Configuration loading and application error types

pub mod config;
pub mod services;
pub mod utils;

pub use config::{AnalysisConfig, AppConfig, ServerConfig};
pub use services::orchestrator::Orchestrator;
pub use services::rewrite::RewriteEngine;
pub use services::suggestion::SuggestionEngine;
pub use services::transport::{serve, ServerState};
pub use utils::error::{AppError, AppResult};
