//! Domain models for runlens.

pub mod ci;
pub mod error;

pub use ci::{
    AnalysisResult, Conclusion, ConfidenceBand, ErrorKind, ErrorRecord, JobRun, LogLine,
    StepRun, StepSegment, WorkflowRun,
};
pub use error::{Result, RunlensError};
