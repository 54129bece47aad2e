//! End-to-end failure analysis for one run.
//!
//! Flow: provider → job logs → [`LogSegmenter`] → failed-step segments →
//! [`ErrorExtractor`] → [`ContextBuilder`] → reasoning service →
//! [`ResponseInterpreter`] → [`AnalysisResult`].
//!
//! Processing is sequential. Provider and reasoning transport errors
//! propagate; an unusable reasoning reply does not.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::ci_diagnostics::{
    no_clear_error, ErrorExtractor, ExtractorConfig, FrameMatcher, SignatureTable,
};
use crate::context::ContextBuilder;
use crate::domain::ci::analysis::AnalysisResult;
use crate::domain::ci::diagnostic::ErrorRecord;
use crate::domain::ci::run::{JobRun, WorkflowRun};
use crate::domain::Result;
use crate::interpreter::{Interpretation, ResponseInterpreter};
use crate::log_segmenter::{LogSegmenter, DEFAULT_STEP_MARKER};
use crate::obs;
use crate::providers::{ExecutionHistoryProvider, ReasoningService};

/// Tunables for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Substring marking the start of a step in a job log.
    pub step_marker: String,

    /// Error records embedded in the reasoning request.
    pub max_context_errors: usize,

    /// Stack frames embedded per error.
    pub max_stack_frames: usize,

    /// Lines scanned after a match for stack frames.
    pub lookahead_lines: usize,

    /// Context lines kept before a match.
    pub context_before: usize,

    /// Context lines kept after a match.
    pub context_after: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let extractor = ExtractorConfig::default();
        let context = ContextBuilder::default();
        Self {
            step_marker: DEFAULT_STEP_MARKER.to_string(),
            max_context_errors: context.max_errors,
            max_stack_frames: context.max_stack_frames,
            lookahead_lines: extractor.lookahead_lines,
            context_before: extractor.context_before,
            context_after: extractor.context_after,
        }
    }
}

/// Evidence gathered locally before the reasoning call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureEvidence {
    pub failed_jobs: Vec<String>,

    /// `job/step` composite names.
    pub failed_steps: Vec<String>,

    /// All errors, in job → step → line order.
    pub errors: Vec<ErrorRecord>,

    /// One-line description per failed step.
    pub step_summaries: Vec<String>,
}

/// A run together with its analysis, for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run: WorkflowRun,
    pub analysis: AnalysisResult,

    /// One-line description per failed step, in `failed_steps` order.
    #[serde(default)]
    pub step_summaries: Vec<String>,
}

/// Orchestrates the analysis of failed runs.
pub struct FailureAnalyzer {
    provider: Arc<dyn ExecutionHistoryProvider>,
    reasoning: Arc<dyn ReasoningService>,
    segmenter: LogSegmenter,
    extractor: ErrorExtractor,
    context_builder: ContextBuilder,
    interpreter: ResponseInterpreter,
}

impl FailureAnalyzer {
    pub fn new(
        provider: Arc<dyn ExecutionHistoryProvider>,
        reasoning: Arc<dyn ReasoningService>,
    ) -> Self {
        Self::with_config(provider, reasoning, AnalyzerConfig::default())
    }

    pub fn with_config(
        provider: Arc<dyn ExecutionHistoryProvider>,
        reasoning: Arc<dyn ReasoningService>,
        config: AnalyzerConfig,
    ) -> Self {
        let extractor = ErrorExtractor::new(SignatureTable::builtin(), FrameMatcher::builtin())
            .with_config(ExtractorConfig {
                lookahead_lines: config.lookahead_lines,
                context_before: config.context_before,
                context_after: config.context_after,
                ..ExtractorConfig::default()
            });
        Self {
            provider,
            reasoning,
            segmenter: LogSegmenter::with_marker(config.step_marker),
            extractor,
            context_builder: ContextBuilder::new(
                config.max_context_errors,
                config.max_stack_frames,
            ),
            interpreter: ResponseInterpreter::new(),
        }
    }

    /// Replace the extractor (e.g. with a custom signature table).
    pub fn with_extractor(mut self, extractor: ErrorExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Fetch and analyze a run by id.
    pub async fn analyze_run(&self, run_id: u64) -> Result<RunReport> {
        let run = self.provider.fetch_run(run_id).await?;
        self.report(run).await
    }

    /// Analyze the most recent failed run, if there is one.
    pub async fn analyze_latest_failure(&self) -> Result<Option<RunReport>> {
        let Some(run) = self.provider.fetch_latest_failed_run().await? else {
            tracing::info!("no failed runs found");
            return Ok(None);
        };
        self.report(run).await.map(Some)
    }

    /// Analyze an already fetched run.
    pub async fn analyze(&self, run: &WorkflowRun) -> Result<AnalysisResult> {
        let (analysis, _) = self
            .analyze_inner(run)
            .instrument(obs::analysis_span(run.id))
            .await?;
        Ok(analysis)
    }

    async fn report(&self, run: WorkflowRun) -> Result<RunReport> {
        let (analysis, step_summaries) = self
            .analyze_inner(&run)
            .instrument(obs::analysis_span(run.id))
            .await?;
        Ok(RunReport {
            run,
            analysis,
            step_summaries,
        })
    }

    async fn analyze_inner(&self, run: &WorkflowRun) -> Result<(AnalysisResult, Vec<String>)> {
        let jobs = self.provider.fetch_jobs(run.id).await?;
        let failed_job_count = jobs.iter().filter(|j| j.is_failed()).count();
        obs::emit_analysis_started(run.id, &run.repository, failed_job_count);

        let evidence = self.collect_evidence(&jobs).await?;

        let document = self.context_builder.build(
            run,
            &evidence.failed_jobs,
            &evidence.failed_steps,
            &evidence.errors,
        );
        let reply = self.reasoning.complete(&document.to_prompt()).await?;

        let interpretation = self.interpreter.interpret(&reply);
        if let Interpretation::Fallback { reason, .. } = &interpretation {
            obs::emit_reasoning_fallback(run.id, reason);
        }

        let result = interpretation.into_result(
            run.id,
            evidence.failed_jobs,
            evidence.failed_steps,
            evidence.errors,
        );
        obs::emit_analysis_finished(
            run.id,
            result.error_contexts.len(),
            document.embedded_errors(),
            result.confidence,
        );
        Ok((result, evidence.step_summaries))
    }

    /// Gather failed job/step names and extracted errors.
    ///
    /// Logs are fetched only for failed jobs. A failed step whose log could
    /// not be segmented is still listed, it just contributes no errors.
    pub async fn collect_evidence(&self, jobs: &[JobRun]) -> Result<FailureEvidence> {
        let mut evidence = FailureEvidence::default();

        for job in jobs.iter().filter(|j| j.is_failed()) {
            evidence.failed_jobs.push(job.name.clone());

            let raw_log = self.provider.fetch_job_log(job.id).await?;
            let segments = self.segmenter.segment(&raw_log, &job.step_names());

            for (step_index, step) in job.steps.iter().enumerate() {
                if !step.is_failed() {
                    continue;
                }
                evidence
                    .failed_steps
                    .push(format!("{}/{}", job.name, step.name));

                let Some(segment) = segments.iter().find(|s| s.step_index == step_index) else {
                    obs::emit_step_unsegmented(&job.name, &step.name);
                    evidence.step_summaries.push(no_clear_error(&step.name));
                    continue;
                };

                let errors = self.extractor.extract(step, segment);
                obs::emit_step_extracted(&job.name, &step.name, errors.len());
                evidence
                    .step_summaries
                    .push(self.extractor.summarize_errors(&step.name, &errors));
                evidence.errors.extend(errors);
            }
        }

        Ok(evidence)
    }
}
