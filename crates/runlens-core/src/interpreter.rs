//! Interpretation of reasoning-service replies.
//!
//! The service is asked for a JSON object but its output is not trusted:
//! anything that does not parse into the expected shape becomes a fixed
//! fallback diagnosis with zero confidence instead of an error.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::ci::analysis::{clamp_confidence, AnalysisResult};
use crate::domain::ci::diagnostic::ErrorRecord;

pub const DEFAULT_SUMMARY: &str = "Analysis unavailable";
pub const DEFAULT_LIKELY_CAUSE: &str = "Unknown";
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const FALLBACK_SUMMARY: &str = "Failed to parse LLM response";
pub const FALLBACK_ACTION: &str = "Review logs manually";

/// Characters of the raw reply kept as the fallback cause.
pub const FALLBACK_CAUSE_CHARS: usize = 500;

/// Diagnosis fields supplied by the reasoning service.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub summary: String,
    pub likely_cause: String,
    pub suggested_actions: Vec<String>,
    pub confidence: f64,
}

impl Diagnosis {
    fn fallback(raw_reply: &str) -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            likely_cause: raw_reply.chars().take(FALLBACK_CAUSE_CHARS).collect(),
            suggested_actions: vec![FALLBACK_ACTION.to_string()],
            confidence: 0.0,
        }
    }
}

/// Outcome of interpreting one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The reply parsed into the expected shape.
    Parsed(Diagnosis),
    /// The reply was unusable; `reason` describes why.
    Fallback { diagnosis: Diagnosis, reason: String },
}

impl Interpretation {
    pub fn diagnosis(&self) -> &Diagnosis {
        match self {
            Interpretation::Parsed(d) => d,
            Interpretation::Fallback { diagnosis, .. } => diagnosis,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Interpretation::Fallback { .. })
    }

    /// Combine with locally gathered evidence into the final result.
    pub fn into_result(
        self,
        run_id: u64,
        failed_jobs: Vec<String>,
        failed_steps: Vec<String>,
        error_contexts: Vec<ErrorRecord>,
    ) -> AnalysisResult {
        let diagnosis = match self {
            Interpretation::Parsed(d) => d,
            Interpretation::Fallback { diagnosis, .. } => diagnosis,
        };
        AnalysisResult {
            run_id,
            summary: diagnosis.summary,
            failed_jobs,
            failed_steps,
            error_contexts,
            likely_cause: diagnosis.likely_cause,
            suggested_actions: diagnosis.suggested_actions,
            confidence: clamp_confidence(diagnosis.confidence),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplyPayload {
    summary: Option<String>,
    likely_cause: Option<String>,
    suggested_actions: Option<Vec<String>>,
    confidence: Option<Value>,
}

/// Stateless reply parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Interpret a raw reply. Never fails.
    pub fn interpret(&self, reply: &str) -> Interpretation {
        let cleaned = strip_code_fence(reply);
        match parse_diagnosis(&cleaned) {
            Ok(diagnosis) => Interpretation::Parsed(diagnosis),
            Err(reason) => {
                tracing::debug!(%reason, "reasoning reply did not parse");
                Interpretation::Fallback {
                    diagnosis: Diagnosis::fallback(reply),
                    reason,
                }
            }
        }
    }
}

/// Trim the reply and, when it opens with a code fence, drop its first and
/// last lines.
fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

fn parse_diagnosis(text: &str) -> Result<Diagnosis, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("reply is not a JSON object".to_string());
    }
    let payload: ReplyPayload = serde_json::from_value(value).map_err(|e| e.to_string())?;

    let confidence = match payload.confidence {
        None | Some(Value::Null) => DEFAULT_CONFIDENCE,
        Some(raw) => coerce_confidence(&raw)?,
    };

    Ok(Diagnosis {
        summary: payload
            .summary
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        likely_cause: payload
            .likely_cause
            .unwrap_or_else(|| DEFAULT_LIKELY_CAUSE.to_string()),
        suggested_actions: payload.suggested_actions.unwrap_or_default(),
        confidence: clamp_confidence(confidence),
    })
}

/// Accept a JSON number or a numeric string.
fn coerce_confidence(raw: &Value) -> Result<f64, String> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("confidence {} is not representable", n)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("confidence {:?} is not numeric", s)),
        other => Err(format!("confidence has unexpected type: {}", other)),
    }
}
