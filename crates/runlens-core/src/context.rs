//! Bounded analysis context for the reasoning service.
//!
//! Every failed job and step is listed, but only the first few error records
//! (and the first few frames of each) are embedded, which keeps the request
//! small while [`AnalysisResult::error_contexts`] retains the full evidence.
//!
//! [`AnalysisResult::error_contexts`]: crate::domain::ci::analysis::AnalysisResult

use serde::{Deserialize, Serialize};

use crate::domain::ci::diagnostic::ErrorRecord;
use crate::domain::ci::run::WorkflowRun;

const PROMPT_INSTRUCTIONS: &str = r#"Based on the above CI failure information, provide a comprehensive analysis in the following JSON format:

{
  "summary": "One-sentence overview of what failed",
  "likely_cause": "Detailed explanation of the root cause",
  "suggested_actions": [
    "Specific action 1",
    "Specific action 2"
  ],
  "confidence": 0.85
}

Focus on:
1. The most likely root cause based on error messages and stack traces
2. Actionable steps a developer can take to fix the issue
3. Any patterns or common issues you recognize

Respond ONLY with valid JSON, no additional text."#;

/// Rendered context plus bookkeeping about what was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContextDocument {
    text: String,
    embedded_errors: usize,
    omitted_errors: usize,
}

impl AnalysisContextDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of error records rendered into the document.
    pub fn embedded_errors(&self) -> usize {
        self.embedded_errors
    }

    /// Number of error records left out by the cap.
    pub fn omitted_errors(&self) -> usize {
        self.omitted_errors
    }

    /// Wrap the document in the fixed JSON-only instruction template.
    pub fn to_prompt(&self) -> String {
        format!("{}\n\n{}", self.text, PROMPT_INSTRUCTIONS)
    }
}

/// Caps applied when rendering error detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBuilder {
    pub max_errors: usize,
    pub max_stack_frames: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            max_errors: 5,
            max_stack_frames: 10,
        }
    }
}

impl ContextBuilder {
    pub fn new(max_errors: usize, max_stack_frames: usize) -> Self {
        Self {
            max_errors,
            max_stack_frames,
        }
    }

    /// Render run metadata, failed jobs/steps and capped error detail.
    pub fn build(
        &self,
        run: &WorkflowRun,
        failed_jobs: &[String],
        failed_steps: &[String],
        errors: &[ErrorRecord],
    ) -> AnalysisContextDocument {
        let mut lines = vec![
            "# CI Failure Analysis Request".to_string(),
            String::new(),
            "## Workflow Information".to_string(),
            format!("- Repository: {}", run.repository),
            format!("- Workflow: {}", run.name),
            format!("- Branch: {}", run.head_branch),
            format!("- Commit: {}", run.short_sha()),
            format!("- Status: {}", run.conclusion_label()),
            String::new(),
            "## Failed Jobs".to_string(),
        ];
        lines.extend(failed_jobs.iter().map(|job| format!("- {}", job)));

        lines.push(String::new());
        lines.push("## Failed Steps".to_string());
        lines.extend(failed_steps.iter().map(|step| format!("- {}", step)));

        lines.push(String::new());
        lines.push("## Error Details".to_string());

        let embedded = errors.len().min(self.max_errors);
        for (i, error) in errors.iter().take(embedded).enumerate() {
            lines.push(format!("### Error {}", i + 1));
            lines.push(format!("Type: {}", error.error_type));
            lines.push(format!("Message: {}", error.error_message));
            if let Some(location) = error.location() {
                lines.push(format!("Location: {}", location));
            }
            if !error.stack_frames.is_empty() {
                lines.push("Stack trace:".to_string());
                lines.extend(
                    error
                        .stack_frames
                        .iter()
                        .take(self.max_stack_frames)
                        .map(|frame| format!("  {}", frame)),
                );
            }
            lines.push(String::new());
        }

        AnalysisContextDocument {
            text: lines.join("\n"),
            embedded_errors: embedded,
            omitted_errors: errors.len() - embedded,
        }
    }
}
