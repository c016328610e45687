//! Business logic services for the PicOS analysis server.

pub mod orchestrator;
pub mod prompts;
pub mod rewrite;
pub mod suggestion;
pub mod transport;
