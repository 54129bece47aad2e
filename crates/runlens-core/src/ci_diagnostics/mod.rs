//! CI diagnostics extraction for failed step logs.
//!
//! Turns a step's raw log lines into structured [`ErrorRecord`] entries:
//! the first matching [`ErrorSignature`] classifies a line, a bounded
//! lookahead collects stack frames, and a context window is kept for display.
//!
//! This is a best-effort heuristic. Lines without a recognizable signature
//! are ignored and never produce an error.
//!
//! [`ErrorRecord`]: crate::domain::ci::diagnostic::ErrorRecord

pub mod extractor;
pub mod signature;

pub use extractor::{no_clear_error, ErrorExtractor, ExtractorConfig};
pub use signature::{ErrorSignature, FrameLocation, FrameMatcher, SignatureTable};
