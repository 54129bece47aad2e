//! Terminal and JSON rendering of analysis results.

use anyhow::{Context, Result};
use std::path::Path;

use crate::analyzer::RunReport;
use crate::domain::ci::analysis::AnalysisResult;
use crate::domain::ci::run::WorkflowRun;

/// Failed steps listed in the text report.
pub const MAX_REPORTED_STEPS: usize = 5;

/// Error details listed in the text report.
pub const MAX_REPORTED_ERRORS: usize = 3;

/// Characters of each error message shown in the text report.
pub const REPORTED_MESSAGE_CHARS: usize = 100;

/// Write an analysis as pretty JSON.
pub fn write_analysis_json(path: &Path, analysis: &AnalysisResult) -> Result<()> {
    let content = serde_json::to_string_pretty(analysis).context("serialize analysis")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render the workflow header block.
pub fn render_run_header(run: &WorkflowRun) -> String {
    let mut out = String::new();
    out.push_str("# Workflow Information\n\n");
    out.push_str(&format!(
        "- repository: {}\n- workflow: {}\n- branch: {}\n- commit: {}\n- status: {}\n",
        run.repository,
        run.name,
        run.head_branch,
        run.short_sha(),
        run.conclusion_label()
    ));
    out
}

/// Render the full plain-text report for terminal output.
pub fn render_analysis_text(run: &WorkflowRun, analysis: &AnalysisResult) -> String {
    render_text(run, analysis, &[])
}

/// Same as [`render_analysis_text`], with a per-step findings section.
pub fn render_report_text(report: &RunReport) -> String {
    render_text(&report.run, &report.analysis, &report.step_summaries)
}

fn render_text(run: &WorkflowRun, analysis: &AnalysisResult, step_summaries: &[String]) -> String {
    let mut out = render_run_header(run);

    out.push_str("\n## Summary\n");
    out.push_str(&format!("{}\n", analysis.summary));

    if !analysis.failed_jobs.is_empty() {
        out.push_str("\n## Failed Jobs\n");
        for job in &analysis.failed_jobs {
            out.push_str(&format!("- {}\n", job));
        }
    }

    if !analysis.failed_steps.is_empty() {
        out.push_str("\n## Failed Steps\n");
        for step in analysis.failed_steps.iter().take(MAX_REPORTED_STEPS) {
            out.push_str(&format!("- {}\n", step));
        }
    }

    if !step_summaries.is_empty() {
        out.push_str("\n## Step Findings\n");
        for summary in step_summaries.iter().take(MAX_REPORTED_STEPS) {
            out.push_str(&format!("- {}\n", summary));
        }
    }

    out.push_str("\n## Likely Cause\n");
    out.push_str(&format!("{}\n", analysis.likely_cause));

    if !analysis.suggested_actions.is_empty() {
        out.push_str("\n## Suggested Actions\n");
        for (i, action) in analysis.suggested_actions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, action));
        }
    }

    out.push_str(&format!(
        "\nConfidence: {:.0}% ({})\n",
        analysis.confidence * 100.0,
        analysis.confidence_band().as_str()
    ));

    if !analysis.error_contexts.is_empty() {
        out.push_str("\n## Error Details\n");
        for (i, error) in analysis
            .error_contexts
            .iter()
            .take(MAX_REPORTED_ERRORS)
            .enumerate()
        {
            let message: String = error
                .error_message
                .chars()
                .take(REPORTED_MESSAGE_CHARS)
                .collect();
            out.push_str(&format!("\nError {}:\n", i + 1));
            out.push_str(&format!("  Type: {}\n", error.error_type));
            out.push_str(&format!("  Message: {}\n", message));
            if let Some(location) = error.location() {
                out.push_str(&format!("  Location: {}\n", location));
            }
        }
    }

    out.push_str(&format!("\nView full workflow: {}\n", run.html_url));
    out
}
