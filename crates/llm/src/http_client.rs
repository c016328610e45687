//! HTTP Client Factory
//!
//! Builds reqwest clients with the per-request timeout applied. Both
//! gateways go through this factory so timeout behavior stays uniform.

use std::time::Duration;

/// Build a `reqwest::Client` with the given request timeout.
pub fn build_http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("failed to build reqwest client")
}
