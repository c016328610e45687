//! Rewrite Engine Integration Tests
//!
//! Covers the acceptance rule (non-empty text, confidence floor, rendered
//! character budget) and the degraded fallback that echoes the original.

use std::sync::Arc;

use serde_json::json;

use picos_core::EXECUTION_TEXT_FIELD;
use picos_server::services::rewrite::{RewriteEngine, RewriteSettings};
use picos_server::AnalysisConfig;

use crate::support::{blank_narrative_record, populated_record, StubGateway, NARRATIVE};

fn engine(stub: Arc<StubGateway>) -> RewriteEngine {
    RewriteEngine::new(stub, RewriteSettings::from(&AnalysisConfig::default()))
}

#[tokio::test]
async fn test_confident_rewrite_within_budget_is_accepted() {
    let stub = Arc::new(StubGateway::new().reply(
        "Please rewrite",
        json!({
            "rewrittenText": "<strong>Execute</strong> 3 facings of 20oz bottles at 2/$4 in the cold vault.",
            "improvements": ["Added facing count", "Highlighted activity type"],
            "confidence": 85
        }),
    ));
    let engine = engine(stub);

    let result = engine.rewrite(&populated_record(), None, &[]).await.unwrap();
    assert_eq!(result.current_text, NARRATIVE);
    assert!(result.rewritten_text.starts_with("<strong>Execute</strong>"));
    assert_eq!(result.confidence, 85);
    assert_eq!(result.improvements.len(), 2);
}

#[tokio::test]
async fn test_low_confidence_rewrite_falls_back_to_original() {
    let stub = Arc::new(StubGateway::new().reply(
        "Please rewrite",
        json!({
            "rewrittenText": "Something short.",
            "improvements": ["Shortened"],
            "confidence": 40
        }),
    ));
    let engine = engine(stub);

    let result = engine.rewrite(&populated_record(), None, &[]).await.unwrap();
    assert_eq!(result.rewritten_text, NARRATIVE);
    assert_eq!(result.current_text, NARRATIVE);
    assert_eq!(result.confidence, 50);
    assert_eq!(
        result.improvements,
        vec!["Enhanced formatting and structure".to_string()]
    );
}

#[tokio::test]
async fn test_over_budget_rewrite_falls_back() {
    let stub = Arc::new(StubGateway::new().reply(
        "Please rewrite",
        json!({
            "rewrittenText": "x".repeat(300),
            "improvements": [],
            "confidence": 95
        }),
    ));
    let engine = engine(stub);

    let result = engine.rewrite(&populated_record(), None, &[]).await.unwrap();
    assert_eq!(result.rewritten_text, NARRATIVE);
    assert_eq!(result.confidence, 50);
}

#[tokio::test]
async fn test_markup_is_excluded_from_the_character_budget() {
    // 260 rendered characters plus markup that pushes the raw length far
    // past the ceiling; only the rendered length counts.
    let rewritten = format!("<strong><em>{}</em></strong>", "y".repeat(260));
    let stub = Arc::new(StubGateway::new().reply(
        "Please rewrite",
        json!({
            "rewrittenText": rewritten,
            "improvements": ["Filled the budget"],
            "confidence": 90
        }),
    ));
    let engine = engine(stub);

    let result = engine.rewrite(&populated_record(), None, &[]).await.unwrap();
    assert_eq!(result.confidence, 90);
    assert!(result.rewritten_text.contains("<strong>"));
}

#[tokio::test]
async fn test_empty_rewritten_text_falls_back() {
    let stub = Arc::new(StubGateway::new().reply(
        "Please rewrite",
        json!({ "rewrittenText": "   ", "improvements": [], "confidence": 90 }),
    ));
    let engine = engine(stub);

    let result = engine.rewrite(&populated_record(), None, &[]).await.unwrap();
    assert_eq!(result.rewritten_text, NARRATIVE);
    assert_eq!(result.confidence, 50);
}

#[tokio::test]
async fn test_blank_narrative_makes_no_gateway_call() {
    let stub = Arc::new(StubGateway::new());
    let engine = engine(stub.clone());

    assert!(engine
        .rewrite(&blank_narrative_record(), None, &[])
        .await
        .is_none());
    assert_eq!(stub.calls(), 0);

    let mut record = populated_record();
    record.set(EXECUTION_TEXT_FIELD, "null");
    assert!(engine.rewrite(&record, None, &[]).await.is_none());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_gateway_error_yields_no_result() {
    let stub = Arc::new(StubGateway::new().fail("Please rewrite"));
    let engine = engine(stub);

    assert!(engine.rewrite(&populated_record(), None, &[]).await.is_none());
}

#[tokio::test]
async fn test_unscripted_reply_degrades_to_fallback() {
    // An empty object parses to empty text and zero confidence.
    let stub = Arc::new(StubGateway::new());
    let engine = engine(stub);

    let result = engine.rewrite(&populated_record(), None, &[]).await.unwrap();
    assert_eq!(result.rewritten_text, NARRATIVE);
    assert_eq!(result.confidence, 50);
}
