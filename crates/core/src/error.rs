//! Core Error Types
//!
//! Defines the foundational error types used across the PicOS analysis
//! workspace. These are dependency-free (only thiserror + serde_json) to keep
//! the core crate lightweight; the server crate extends them with transport
//! and configuration variants.

use thiserror::Error;

/// Core error type for the PicOS analysis workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Inbound command or payload parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
