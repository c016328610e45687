//! PicOS Analysis Core
//!
//! Shared types for the PicOS analysis workspace:
//! - Record model and value normalization rules
//! - Field policy table (literal vs. suggestive improvement styles)
//! - Analysis step / suggestion / rewrite payload types
//! - Wire protocol types for the streaming transport
//!
//! These types are dependency-light (serde + thiserror) so both the LLM
//! crate and the server crate can build on them.

pub mod error;
pub mod event;
pub mod policy;
pub mod record;
pub mod suggestion;

pub use error::{CoreError, CoreResult};
pub use event::{AnalysisStep, ClientCommand, ServerEvent, StepData, StepType};
pub use policy::{FieldPolicy, ImprovementStyle, PolicyTable};
pub use record::{
    is_blank_value, normalize_value, Record, ACTIVITY_TYPE_FIELD, EXECUTION_TEXT_FIELD,
};
pub use suggestion::{FieldSuggestion, RewriteResult, RewriteVariant, RewriteVariation};
