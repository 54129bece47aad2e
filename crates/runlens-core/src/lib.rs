//! runlens Core Library
//!
//! Turns a failed CI run into a root-cause analysis: job logs are split into
//! per-step segments, failed steps are scanned for error evidence, the
//! evidence is condensed into a document for an external reasoning service,
//! and its reply is interpreted into an [`AnalysisResult`].

pub mod analyzer;
pub mod ci_diagnostics;
pub mod context;
pub mod domain;
pub mod fakes;
pub mod interpreter;
pub mod log_segmenter;
pub mod obs;
pub mod providers;
pub mod reporting;
pub mod telemetry;

pub use analyzer::{AnalyzerConfig, FailureAnalyzer, FailureEvidence, RunReport};
pub use ci_diagnostics::{
    ErrorExtractor, ErrorSignature, ExtractorConfig, FrameLocation, FrameMatcher, SignatureTable,
};
pub use context::{AnalysisContextDocument, ContextBuilder};
pub use domain::{
    AnalysisResult, Conclusion, ConfidenceBand, ErrorKind, ErrorRecord, JobRun, LogLine, Result,
    RunlensError, StepRun, StepSegment, WorkflowRun,
};
pub use interpreter::{Diagnosis, Interpretation, ResponseInterpreter};
pub use log_segmenter::{LogSegmenter, DEFAULT_STEP_MARKER};
pub use providers::{ExecutionHistoryProvider, ReasoningService};
pub use reporting::{
    render_analysis_text, render_report_text, render_run_header, write_analysis_json,
};

pub use obs::{
    analysis_span, emit_analysis_finished, emit_analysis_started, emit_reasoning_fallback,
    emit_step_extracted, emit_step_unsegmented,
};
pub use telemetry::{init_tracing, LogFormat};

/// runlens version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
