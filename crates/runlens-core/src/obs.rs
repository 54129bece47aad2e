//! Structured observability hooks for the analysis lifecycle.
//!
//! This module provides:
//! - An analysis-scoped tracing span via [`analysis_span`]
//! - Emission functions for key events: start, per-step extraction,
//!   reasoning fallback, finish
//!
//! Events are emitted at `info!` level; degraded outcomes warn.

use tracing::{info, warn};

/// Span tagging every event of one analysis with its run id.
///
/// # Example
///
/// ```ignore
/// analyzer.analyze_inner(&run).instrument(analysis_span(run.id)).await
/// ```
pub fn analysis_span(run_id: u64) -> tracing::Span {
    tracing::info_span!("runlens.analysis", run_id = run_id)
}

/// Emit event: analysis started for a run with the given failed jobs.
pub fn emit_analysis_started(run_id: u64, repository: &str, failed_jobs: usize) {
    info!(
        event = "analysis.started",
        run_id = run_id,
        repository = %repository,
        failed_jobs = failed_jobs,
    );
}

/// Emit event: errors extracted from one failed step.
pub fn emit_step_extracted(job: &str, step: &str, errors: usize) {
    info!(event = "step.extracted", job = %job, step = %step, errors = errors);
}

/// Emit event: a failed step had no attributable log segment.
pub fn emit_step_unsegmented(job: &str, step: &str) {
    warn!(event = "step.unsegmented", job = %job, step = %step);
}

/// Emit event: the reasoning reply was unusable and the fallback was used.
pub fn emit_reasoning_fallback(run_id: u64, reason: &str) {
    warn!(event = "reasoning.fallback", run_id = run_id, reason = %reason);
}

/// Emit event: analysis finished.
pub fn emit_analysis_finished(run_id: u64, errors: usize, embedded: usize, confidence: f64) {
    info!(
        event = "analysis.finished",
        run_id = run_id,
        errors = errors,
        embedded_errors = embedded,
        confidence = confidence,
    );
}
