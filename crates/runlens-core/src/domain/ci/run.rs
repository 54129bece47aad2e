//! Workflow run, job and step metadata as reported by the execution history
//! provider.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final outcome of a run, job or step.
///
/// Unrecognized values are kept verbatim in [`Conclusion::Other`] so a new
/// provider outcome never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    Neutral,
    ActionRequired,
    Stale,
    Other(String),
}

impl Conclusion {
    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::TimedOut => "timed_out",
            Conclusion::Neutral => "neutral",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Stale => "stale",
            Conclusion::Other(raw) => raw,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Conclusion::Failure)
    }
}

impl From<&str> for Conclusion {
    fn from(raw: &str) -> Self {
        match raw {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "cancelled" => Conclusion::Cancelled,
            "skipped" => Conclusion::Skipped,
            "timed_out" => Conclusion::TimedOut,
            "neutral" => Conclusion::Neutral,
            "action_required" => Conclusion::ActionRequired,
            "stale" => Conclusion::Stale,
            other => Conclusion::Other(other.to_string()),
        }
    }
}

impl From<String> for Conclusion {
    fn from(raw: String) -> Self {
        Conclusion::from(raw.as_str())
    }
}

impl From<Conclusion> for String {
    fn from(conclusion: Conclusion) -> Self {
        conclusion.as_str().to_string()
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRun {
    pub id: u64,

    /// Workflow name.
    pub name: String,

    /// Repository identifier (`owner/repo`).
    pub repository: String,

    pub head_branch: String,

    pub head_sha: String,

    /// Lifecycle status (`queued`, `in_progress`, `completed`, ...).
    pub status: String,

    /// `None` while the run has not completed.
    pub conclusion: Option<Conclusion>,

    pub html_url: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl WorkflowRun {
    /// Abbreviated commit SHA (first 8 characters).
    pub fn short_sha(&self) -> &str {
        self.head_sha.get(..8).unwrap_or(&self.head_sha)
    }

    /// Conclusion label for display, `"unknown"` when not yet concluded.
    pub fn conclusion_label(&self) -> &str {
        self.conclusion
            .as_ref()
            .map(Conclusion::as_str)
            .unwrap_or("unknown")
    }
}

/// A named unit of work within a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRun {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub conclusion: Option<Conclusion>,
    pub html_url: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<StepRun>,
}

impl JobRun {
    pub fn is_failed(&self) -> bool {
        self.conclusion.as_ref().is_some_and(Conclusion::is_failure)
    }

    /// Step names in execution order, as needed by the log segmenter.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name.clone()).collect()
    }
}

/// A named sub-unit of a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRun {
    /// 1-indexed position reported by the provider.
    pub number: u32,
    pub name: String,
    pub status: String,
    pub conclusion: Option<Conclusion>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StepRun {
    /// Completed step with the given outcome and no timing data.
    pub fn completed(number: u32, name: impl Into<String>, conclusion: Conclusion) -> Self {
        Self {
            number,
            name: name.into(),
            status: "completed".to_string(),
            conclusion: Some(conclusion),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.conclusion.as_ref().is_some_and(Conclusion::is_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run(sha: &str) -> WorkflowRun {
        WorkflowRun {
            id: 7,
            name: "CI".to_string(),
            repository: "octo/widgets".to_string(),
            head_branch: "main".to_string(),
            head_sha: sha.to_string(),
            status: "completed".to_string(),
            conclusion: Some(Conclusion::Failure),
            html_url: "https://github.com/octo/widgets/actions/runs/7".to_string(),
            created_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("parse RFC3339")
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339("2026-01-01T00:05:00Z")
                .expect("parse RFC3339")
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_conclusion_known_values_roundtrip_through_strings() {
        for raw in [
            "success",
            "failure",
            "cancelled",
            "skipped",
            "timed_out",
            "neutral",
            "action_required",
            "stale",
        ] {
            let conclusion = Conclusion::from(raw);
            assert!(!matches!(conclusion, Conclusion::Other(_)), "{raw}");
            assert_eq!(conclusion.as_str(), raw);
        }
    }

    #[test]
    fn test_conclusion_unknown_value_is_preserved() {
        let conclusion: Conclusion = serde_json::from_str("\"startup_failure\"").expect("parse");
        assert_eq!(conclusion, Conclusion::Other("startup_failure".to_string()));
        assert!(!conclusion.is_failure());
        assert_eq!(
            serde_json::to_string(&conclusion).expect("serialize"),
            "\"startup_failure\""
        );
    }

    #[test]
    fn test_short_sha_truncates_to_eight_chars() {
        assert_eq!(sample_run("0123456789abcdef").short_sha(), "01234567");
        assert_eq!(sample_run("abc").short_sha(), "abc");
    }

    #[test]
    fn test_conclusion_label_defaults_to_unknown() {
        let mut run = sample_run("0123456789abcdef");
        assert_eq!(run.conclusion_label(), "failure");
        run.conclusion = None;
        assert_eq!(run.conclusion_label(), "unknown");
    }

    #[test]
    fn test_job_failure_detection() {
        let job = JobRun {
            id: 1,
            name: "test".to_string(),
            status: "completed".to_string(),
            conclusion: Some(Conclusion::Failure),
            html_url: None,
            started_at: None,
            completed_at: None,
            steps: vec![
                StepRun::completed(1, "checkout", Conclusion::Success),
                StepRun::completed(2, "cargo test", Conclusion::Failure),
            ],
        };
        assert!(job.is_failed());
        assert_eq!(job.step_names(), vec!["checkout", "cargo test"]);
        assert!(!job.steps[0].is_failed());
        assert!(job.steps[1].is_failed());
    }
}
