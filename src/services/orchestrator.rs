//! Analysis Orchestrator
//!
//! Per-run state machine driving the numbered step sequence: initialize,
//! scan fields, analyze context, fan out field suggestions, then either halt
//! pending suggestion resolution or continue into the rewrite phase. A fresh
//! orchestrator is constructed per inbound command, so no state crosses
//! runs. Steps flow out through an mpsc channel in increasing step order;
//! every engine call is an await point. Individual engine failures degrade
//! to "no result" for that field or pass, so the step sequence always runs
//! to a terminal event.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use picos_core::{
    AnalysisStep, FieldSuggestion, PolicyTable, Record, RewriteResult, RewriteVariant,
    RewriteVariation, StepData,
};
use picos_llm::LlmGateway;

use crate::config::AnalysisConfig;
use crate::services::rewrite::{RewriteEngine, RewriteSettings};
use crate::services::suggestion::SuggestionEngine;
use crate::utils::text::normalize_rendered;

/// Run terminated early: the receiver is gone or the run was cancelled.
struct Aborted;

pub struct Orchestrator {
    suggestions: SuggestionEngine,
    rewrites: RewriteEngine,
    policies: Arc<PolicyTable>,
    auto_surface_threshold: u8,
    concurrency: usize,
    tx: mpsc::Sender<AnalysisStep>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        policies: Arc<PolicyTable>,
        analysis: &AnalysisConfig,
        tx: mpsc::Sender<AnalysisStep>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            suggestions: SuggestionEngine::new(
                gateway.clone(),
                policies.clone(),
                analysis.default_field_threshold,
            ),
            rewrites: RewriteEngine::new(gateway, RewriteSettings::from(analysis)),
            policies,
            auto_surface_threshold: analysis.auto_surface_threshold,
            concurrency: analysis.concurrency.max(1),
            tx,
            cancel,
        }
    }

    /// Full analysis run: steps 1 through 5, halting if field suggestions
    /// surface, otherwise continuing into the rewrite phase (steps 7 and 8).
    pub async fn analyze_record(&self, record: &Record, images: &[String]) {
        if self.run_record(record, images).await.is_err() {
            tracing::debug!("analysis run aborted");
        }
    }

    /// Rewrite-only run (steps 7 and 8), used after the caller has resolved
    /// all outstanding field suggestions.
    pub async fn analyze_execution_details(&self, record: &Record, images: &[String]) {
        if self.run_rewrite_phase(record, images).await.is_err() {
            tracing::debug!("execution details run aborted");
        }
    }

    async fn run_record(&self, record: &Record, images: &[String]) -> Result<(), Aborted> {
        self.emit(AnalysisStep::analysis(1, "Initializing analysis workflow..."))
            .await?;
        self.emit(AnalysisStep::complete(
            1,
            "Analysis workflow initialized successfully",
        ))
        .await?;

        self.emit(AnalysisStep::analysis(
            2,
            "Scanning record fields for missing data...",
        ))
        .await?;
        let (empty_fields, populated_fields): (Vec<&String>, Vec<&String>) = self
            .policies
            .scan_fields()
            .iter()
            .partition(|field| record.is_blank(field));
        self.emit(AnalysisStep::complete(
            2,
            format!(
                "Found {} empty fields and {} populated fields to verify",
                empty_fields.len(),
                populated_fields.len()
            ),
        ))
        .await?;

        self.emit(AnalysisStep::analysis(
            3,
            "Analyzing execution details for contextual insights...",
        ))
        .await?;
        self.emit(AnalysisStep::complete(
            3,
            "Execution details analyzed successfully",
        ))
        .await?;

        self.emit(AnalysisStep::analysis(4, "Generating AI-powered suggestions..."))
            .await?;
        let suggestions = self.suggest_fields(record).await?;
        self.emit(AnalysisStep::complete(
            4,
            format!("Generated {} high-confidence suggestions", suggestions.len()),
        ))
        .await?;

        if !suggestions.is_empty() {
            let missing = suggestions.iter().filter(|s| s.is_empty).count();
            let discrepancies = suggestions.iter().filter(|s| s.is_discrepancy).count();
            self.emit(AnalysisStep::suggestion(
                5,
                format!(
                    "Found {} missing data suggestions and {} discrepancies",
                    missing, discrepancies
                ),
                StepData::Suggestions { suggestions },
            ))
            .await?;
            self.emit(AnalysisStep::complete(
                6,
                "Please resolve field suggestions first, then execution details \
                 will be analyzed with updated data",
            ))
            .await?;
            return Ok(());
        }

        if record.is_blank(picos_core::EXECUTION_TEXT_FIELD) {
            self.emit(AnalysisStep::complete(
                5,
                "Analysis complete - no suggestions found and no execution details to review",
            ))
            .await?;
            return Ok(());
        }

        self.run_rewrite_phase(record, images).await
    }

    async fn run_rewrite_phase(&self, record: &Record, images: &[String]) -> Result<(), Aborted> {
        self.emit(AnalysisStep::analysis(
            7,
            "Analyzing execution details for improvement opportunities...",
        ))
        .await?;

        if self.cancel.is_cancelled() {
            return Err(Aborted);
        }
        let passes = [
            None,
            Some(RewriteVariation::Concise),
            Some(RewriteVariation::Detailed),
        ];
        let results: Vec<Option<RewriteResult>> = stream::iter(passes)
            .map(|variation| self.rewrites.rewrite(record, variation, images))
            .buffered(self.concurrency)
            .collect()
            .await;

        self.emit(AnalysisStep::complete(
            7,
            "Execution details analysis completed",
        ))
        .await?;

        match assemble_rewrites(results) {
            Some((execution_rewrite, variants)) => {
                self.emit(AnalysisStep::suggestion(
                    8,
                    "Generated improved execution details for review.",
                    StepData::Rewrite {
                        execution_rewrite,
                        variants,
                    },
                ))
                .await?;
                self.emit(AnalysisStep::complete(8, "Analysis workflow completed"))
                    .await?;
            }
            None => {
                self.emit(AnalysisStep::complete(
                    8,
                    "Execution details are already well-written.",
                ))
                .await?;
            }
        }
        Ok(())
    }

    /// Bounded, order-preserving suggestion fan-out over every analyzable
    /// field, keeping only suggestions strong enough to auto-surface.
    async fn suggest_fields(&self, record: &Record) -> Result<Vec<FieldSuggestion>, Aborted> {
        if self.cancel.is_cancelled() {
            return Err(Aborted);
        }
        // Build the (lazy) call futures up front; mapping the stream through
        // a borrowing closure would pin the run future to a local lifetime
        // and make it unspawnable.
        let calls: Vec<_> = self
            .policies
            .scan_fields()
            .iter()
            .map(|field| self.suggestions.suggest(field, record))
            .collect();
        let results: Vec<Option<FieldSuggestion>> = stream::iter(calls)
            .buffered(self.concurrency)
            .collect()
            .await;
        Ok(results
            .into_iter()
            .flatten()
            .filter(|s| s.confidence >= self.auto_surface_threshold)
            .collect())
    }

    async fn emit(&self, step: AnalysisStep) -> Result<(), Aborted> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Aborted),
            sent = self.tx.send(step) => sent.map_err(|_| Aborted),
        }
    }
}

/// Fold the three rewrite passes (faithful, concise, detailed, in that
/// order) into a primary result plus deduplicated variants. If the faithful
/// pass failed, the first surviving variant is promoted to primary. Variants
/// whose normalized rendered text matches the primary or an earlier variant
/// are dropped.
fn assemble_rewrites(
    results: Vec<Option<RewriteResult>>,
) -> Option<(RewriteResult, Vec<RewriteVariant>)> {
    let mut results = results.into_iter();
    let mut primary = results.next().flatten();
    let mut variants: Vec<RewriteVariant> = [RewriteVariation::Concise, RewriteVariation::Detailed]
        .into_iter()
        .zip(results)
        .filter_map(|(variation, result)| {
            result.map(|result| RewriteVariant { variation, result })
        })
        .collect();

    if primary.is_none() && !variants.is_empty() {
        primary = Some(variants.remove(0).result);
    }
    let primary = primary?;

    let mut seen = vec![normalize_rendered(&primary.rewritten_text)];
    variants.retain(|variant| {
        let key = normalize_rendered(&variant.result.rewritten_text);
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    Some((primary, variants))
}
