//! Orchestrator End-to-End Scenario Tests
//!
//! Drives full analysis runs through the scripted gateway and asserts the
//! emitted step stream: numbering, phase tags, halt-vs-continue branching,
//! and rewrite variant assembly.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use picos_core::{
    AnalysisStep, PolicyTable, Record, RewriteVariation, StepData, StepType,
    EXECUTION_TEXT_FIELD,
};
use picos_server::{AnalysisConfig, Orchestrator};

use crate::support::{blank_narrative_record, populated_record, StubGateway};

// ============================================================================
// Helpers
// ============================================================================

fn orchestrator(
    stub: Arc<StubGateway>,
    tx: mpsc::Sender<AnalysisStep>,
    cancel: CancellationToken,
) -> Orchestrator {
    Orchestrator::new(
        stub,
        Arc::new(PolicyTable::standard()),
        &AnalysisConfig::default(),
        tx,
        cancel,
    )
}

async fn run_record(stub: Arc<StubGateway>, record: Record) -> Vec<AnalysisStep> {
    let (tx, mut rx) = mpsc::channel(32);
    let orch = orchestrator(stub, tx, CancellationToken::new());
    orch.analyze_record(&record, &[]).await;
    drop(orch);

    let mut steps = Vec::new();
    while let Some(step) = rx.recv().await {
        steps.push(step);
    }
    steps
}

async fn run_details(stub: Arc<StubGateway>, record: Record) -> Vec<AnalysisStep> {
    let (tx, mut rx) = mpsc::channel(32);
    let orch = orchestrator(stub, tx, CancellationToken::new());
    orch.analyze_execution_details(&record, &[]).await;
    drop(orch);

    let mut steps = Vec::new();
    while let Some(step) = rx.recv().await {
        steps.push(step);
    }
    steps
}

fn pricing_suggestion(confidence: u32) -> serde_json::Value {
    json!({
        "hasSuggestion": true,
        "suggestedValue": "2/$4",
        "confidence": confidence,
        "reasoning": "The execution details state a 2 for $4 price point.",
        "isDiscrepancy": false
    })
}

fn rewrite_reply(text: &str) -> serde_json::Value {
    json!({
        "rewrittenText": text,
        "improvements": ["Clearer structure"],
        "confidence": 85
    })
}

fn assert_monotonic_steps(steps: &[AnalysisStep]) {
    for pair in steps.windows(2) {
        assert!(
            pair[0].step <= pair[1].step,
            "step numbers went backwards: {} then {}",
            pair[0].step,
            pair[1].step
        );
    }
}

// ============================================================================
// Full analysis runs
// ============================================================================

#[tokio::test]
async fn test_populated_record_with_blank_narrative_completes_at_step_five() {
    let stub = Arc::new(StubGateway::new());
    let steps = run_record(stub.clone(), blank_narrative_record()).await;

    assert_monotonic_steps(&steps);
    let last = steps.last().unwrap();
    assert_eq!(last.step, 5);
    assert_eq!(last.step_type, StepType::Complete);
    assert!(last.message.contains("no suggestions"));
    assert!(steps.iter().all(|s| s.step <= 5));
    // Blank narrative short-circuits every suggestion call.
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_high_confidence_suggestion_halts_before_rewrite() {
    let stub = Arc::new(StubGateway::new().reply(
        "the \"Pricing__c\" field",
        pricing_suggestion(95),
    ));
    let mut record = populated_record();
    record.set("Pricing__c", "");

    let steps = run_record(stub.clone(), record).await;
    assert_monotonic_steps(&steps);

    let suggestion_step = steps
        .iter()
        .find(|s| s.step_type == StepType::Suggestion)
        .expect("a suggestion step");
    assert_eq!(suggestion_step.step, 5);
    match suggestion_step.data.as_ref().unwrap() {
        StepData::Suggestions { suggestions } => {
            assert_eq!(suggestions.len(), 1);
            assert_eq!(suggestions[0].field, "Pricing__c");
            assert!(suggestions[0].is_empty);
        }
        other => panic!("expected suggestions payload, got {:?}", other),
    }

    let last = steps.last().unwrap();
    assert_eq!(last.step, 6);
    assert_eq!(last.step_type, StepType::Complete);
    assert!(last.message.contains("resolve field suggestions first"));
    assert!(steps.iter().all(|s| s.step <= 6));
    // One suggestion call per analyzable field, no rewrite calls.
    assert_eq!(stub.calls(), PolicyTable::standard().len());
}

#[tokio::test]
async fn test_suggestion_below_auto_surface_gate_does_not_halt() {
    // 85 clears the per-field threshold but not the auto-surface gate.
    let stub = Arc::new(
        StubGateway::new()
            .reply("the \"Pricing__c\" field", pricing_suggestion(85))
            .reply("CONCISE variant", rewrite_reply("Concise rewrite."))
            .reply("DETAILED variant", rewrite_reply("Detailed rewrite of the plan."))
            .reply("Please rewrite", rewrite_reply("Primary rewrite.")),
    );
    let mut record = populated_record();
    record.set("Pricing__c", "");

    let steps = run_record(stub, record).await;
    assert!(steps.iter().any(|s| s.step == 7));
    assert!(steps.iter().all(|s| s.step != 6));
}

#[tokio::test]
async fn test_clean_record_proceeds_through_rewrite_phase() {
    let stub = Arc::new(
        StubGateway::new()
            .reply("CONCISE variant", rewrite_reply("Concise rewrite."))
            .reply("DETAILED variant", rewrite_reply("Detailed rewrite of the plan."))
            .reply("Please rewrite", rewrite_reply("Primary rewrite.")),
    );
    let steps = run_record(stub.clone(), populated_record()).await;
    assert_monotonic_steps(&steps);

    // An empty suggestion set falls straight through: no step 5 or 6.
    assert!(steps.iter().all(|s| s.step != 5 && s.step != 6));
    let numbers: Vec<u32> = steps.iter().map(|s| s.step).collect();
    assert_eq!(numbers, vec![1, 1, 2, 2, 3, 3, 4, 4, 7, 7, 8, 8]);

    let rewrite_step = steps
        .iter()
        .find(|s| s.step == 8 && s.step_type == StepType::Suggestion)
        .expect("the step-8 rewrite payload");
    match rewrite_step.data.as_ref().unwrap() {
        StepData::Rewrite {
            execution_rewrite,
            variants,
        } => {
            assert_eq!(execution_rewrite.rewritten_text, "Primary rewrite.");
            assert_eq!(variants.len(), 2);
            assert_eq!(variants[0].variation, RewriteVariation::Concise);
            assert_eq!(variants[1].variation, RewriteVariation::Detailed);
        }
        other => panic!("expected rewrite payload, got {:?}", other),
    }

    let last = steps.last().unwrap();
    assert_eq!(last.step, 8);
    assert_eq!(last.step_type, StepType::Complete);
    // Six suggestion calls plus three rewrite passes.
    assert_eq!(stub.calls(), PolicyTable::standard().len() + 3);
}

#[tokio::test]
async fn test_run_spawned_on_task_streams_steps_while_running() {
    // The transport drives every run from a spawned task, so the run future
    // must be Send + 'static, suggestion fan-out included.
    let stub = Arc::new(
        StubGateway::new()
            .reply("CONCISE variant", rewrite_reply("Concise rewrite."))
            .reply("DETAILED variant", rewrite_reply("Detailed rewrite of the plan."))
            .reply("Please rewrite", rewrite_reply("Primary rewrite.")),
    );
    let (tx, mut rx) = mpsc::channel(1);
    let orch = orchestrator(stub, tx, CancellationToken::new());
    let record = populated_record();
    let run = tokio::spawn(async move {
        orch.analyze_record(&record, &[]).await;
    });

    let mut steps = Vec::new();
    while let Some(step) = rx.recv().await {
        steps.push(step);
    }
    run.await.unwrap();

    assert_monotonic_steps(&steps);
    assert_eq!(steps.first().unwrap().step, 1);
    let last = steps.last().unwrap();
    assert_eq!(last.step, 8);
    assert_eq!(last.step_type, StepType::Complete);
}

// ============================================================================
// Rewrite phase details
// ============================================================================

#[tokio::test]
async fn test_variant_matching_primary_after_markup_strip_is_dropped() {
    let stub = Arc::new(
        StubGateway::new()
            .reply(
                "CONCISE variant",
                rewrite_reply("Execute the cold vault reset."),
            )
            .reply("DETAILED variant", rewrite_reply("Detailed rewrite of the plan."))
            .reply(
                "Please rewrite",
                rewrite_reply("<strong>Execute</strong> the cold vault reset."),
            ),
    );
    let steps = run_record(stub, populated_record()).await;

    let rewrite_step = steps
        .iter()
        .find(|s| s.step == 8 && s.step_type == StepType::Suggestion)
        .unwrap();
    match rewrite_step.data.as_ref().unwrap() {
        StepData::Rewrite { variants, .. } => {
            assert_eq!(variants.len(), 1);
            assert_eq!(variants[0].variation, RewriteVariation::Detailed);
        }
        other => panic!("expected rewrite payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_faithful_pass_promotes_first_variant() {
    let stub = Arc::new(
        StubGateway::new()
            .reply("CONCISE variant", rewrite_reply("Concise rewrite."))
            .reply("DETAILED variant", rewrite_reply("Detailed rewrite of the plan."))
            .fail("Please rewrite"),
    );
    let steps = run_record(stub, populated_record()).await;

    let rewrite_step = steps
        .iter()
        .find(|s| s.step == 8 && s.step_type == StepType::Suggestion)
        .unwrap();
    match rewrite_step.data.as_ref().unwrap() {
        StepData::Rewrite {
            execution_rewrite,
            variants,
        } => {
            assert_eq!(execution_rewrite.rewritten_text, "Concise rewrite.");
            assert_eq!(variants.len(), 1);
            assert_eq!(variants[0].variation, RewriteVariation::Detailed);
        }
        other => panic!("expected rewrite payload, got {:?}", other),
    }
}

// ============================================================================
// Rewrite-only runs
// ============================================================================

#[tokio::test]
async fn test_details_run_emits_only_rewrite_steps() {
    let stub = Arc::new(
        StubGateway::new()
            .reply("CONCISE variant", rewrite_reply("Concise rewrite."))
            .reply("DETAILED variant", rewrite_reply("Detailed rewrite of the plan."))
            .reply("Please rewrite", rewrite_reply("Primary rewrite.")),
    );
    let steps = run_details(stub.clone(), populated_record()).await;

    assert_eq!(steps.first().unwrap().step, 7);
    assert!(steps.iter().all(|s| s.step == 7 || s.step == 8));
    assert_eq!(stub.calls(), 3);
}

#[tokio::test]
async fn test_details_run_with_blank_narrative_reports_nothing_to_improve() {
    let stub = Arc::new(StubGateway::new());
    let mut record = populated_record();
    record.set(EXECUTION_TEXT_FIELD, "");

    let steps = run_details(stub.clone(), record).await;
    let last = steps.last().unwrap();
    assert_eq!(last.step, 8);
    assert_eq!(last.step_type, StepType::Complete);
    assert!(last.message.contains("already well-written"));
    assert!(steps.iter().all(|s| s.step_type != StepType::Suggestion));
    assert_eq!(stub.calls(), 0);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_run_emits_no_steps() {
    let stub = Arc::new(StubGateway::new());
    let (tx, mut rx) = mpsc::channel(32);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let orch = orchestrator(stub.clone(), tx, cancel);
    orch.analyze_record(&populated_record(), &[]).await;
    drop(orch);

    assert!(rx.recv().await.is_none());
    assert_eq!(stub.calls(), 0);
}
