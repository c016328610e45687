//! Shared test support: a scripted gateway stub and record builders.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use picos_core::{Record, EXECUTION_TEXT_FIELD};
use picos_llm::{GatewayConfig, GatewayRequest, LlmError, LlmGateway, LlmResult};

enum StubReply {
    Value(Value),
    Error,
}

/// Scripted gateway. Each rule pairs a user-prompt substring with a canned
/// reply; the first matching rule wins. An unmatched prompt yields an empty
/// object, the same degraded shape a real gateway returns for non-JSON
/// model output.
pub struct StubGateway {
    config: GatewayConfig,
    rules: Vec<(String, StubReply)>,
    calls: AtomicUsize,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Reply with `value` for prompts containing `needle`.
    pub fn reply(mut self, needle: &str, value: Value) -> Self {
        self.rules.push((needle.to_string(), StubReply::Value(value)));
        self
    }

    /// Fail the call for prompts containing `needle`.
    pub fn fail(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), StubReply::Error));
        self
    }

    /// Total number of `invoke` calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn invoke(&self, request: GatewayRequest) -> LlmResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (needle, reply) in &self.rules {
            if request.user_prompt.contains(needle.as_str()) {
                return match reply {
                    StubReply::Value(value) => Ok(value.clone()),
                    StubReply::Error => Err(LlmError::Other {
                        message: format!("scripted failure for '{}'", needle),
                    }),
                };
            }
        }
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }
}

pub const NARRATIVE: &str =
    "<strong>Execute</strong> 2 facings of 20oz bottles in the cold vault at 2/$4.";

/// A record with every analyzable field populated and a narrative present.
pub fn populated_record() -> Record {
    Record::from_pairs([
        ("Name", "PicOS Activity 001"),
        ("Activity_type__c", "Execute"),
        ("POI_Picklist__c", "Cold Vault"),
        ("Channel_Picklist__c", "Convenience"),
        ("Pricing__c", "2/$4"),
        ("Promo_Offer__c", "Buy 2 Save $1"),
        ("Package_Detail__c", "20oz bottle"),
        (EXECUTION_TEXT_FIELD, NARRATIVE),
    ])
}

/// A fully populated record whose narrative text is blank.
pub fn blank_narrative_record() -> Record {
    let mut record = populated_record();
    record.set(EXECUTION_TEXT_FIELD, "   ");
    record
}
