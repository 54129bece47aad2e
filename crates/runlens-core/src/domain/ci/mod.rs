//! CI domain model types for runlens.
//!
//! Core entities for the analysis pipeline:
//! - `WorkflowRun` / `JobRun` / `StepRun`: run metadata from the provider
//! - `StepSegment`: per-step slice of a job log
//! - `ErrorRecord`: evidence extracted from a failed step
//! - `AnalysisResult`: final diagnosis handed to presentation

pub mod analysis;
pub mod diagnostic;
pub mod log;
pub mod run;

pub use analysis::{clamp_confidence, AnalysisResult, ConfidenceBand};
pub use diagnostic::{ErrorKind, ErrorRecord};
pub use log::{LogLine, StepSegment};
pub use run::{Conclusion, JobRun, StepRun, WorkflowRun};
