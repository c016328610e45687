//! Shared utilities for the server crate.

pub mod error;
pub mod text;
