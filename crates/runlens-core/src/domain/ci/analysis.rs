//! Terminal output of the analysis pipeline.

use serde::{Deserialize, Serialize};

use super::diagnostic::ErrorRecord;

/// Root-cause analysis for one failed run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub run_id: u64,

    /// One-sentence overview of what failed.
    pub summary: String,

    pub failed_jobs: Vec<String>,

    /// `job/step` composite names.
    pub failed_steps: Vec<String>,

    /// Every extracted error, including ones left out of the reasoning
    /// request.
    pub error_contexts: Vec<ErrorRecord>,

    pub likely_cause: String,

    pub suggested_actions: Vec<String>,

    /// In `[0.0, 1.0]`. `0.0` means the reasoning reply was unusable.
    pub confidence: f64,
}

/// Coarse confidence buckets used for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(confidence: f64) -> Self {
        if confidence > 0.7 {
            ConfidenceBand::High
        } else if confidence > 0.4 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

impl AnalysisResult {
    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.confidence)
    }
}

/// Clamp a confidence score into `[0.0, 1.0]`; NaN becomes `0.0`.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
