//! Line-level error extraction for failed steps.

use crate::domain::ci::diagnostic::ErrorRecord;
use crate::domain::ci::log::{LogLine, StepSegment};
use crate::domain::ci::run::StepRun;

use super::signature::{FrameMatcher, SignatureTable};

/// Window sizes used while building an [`ErrorRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Maximum number of lines after a match scanned for stack frames.
    pub lookahead_lines: usize,

    /// Context lines kept before the match.
    pub context_before: usize,

    /// Context lines kept after the match.
    pub context_after: usize,

    /// Characters of the error message kept in [`ErrorExtractor::summarize`].
    pub summary_message_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            lookahead_lines: 20,
            context_before: 5,
            context_after: 10,
            summary_message_chars: 100,
        }
    }
}

/// Scans step logs for error signatures, stack frames and context windows.
#[derive(Debug, Clone, Default)]
pub struct ErrorExtractor {
    signatures: SignatureTable,
    frames: FrameMatcher,
    config: ExtractorConfig,
}

impl ErrorExtractor {
    pub fn new(signatures: SignatureTable, frames: FrameMatcher) -> Self {
        Self {
            signatures,
            frames,
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract errors from a step's segment. Steps that did not fail yield
    /// nothing.
    pub fn extract(&self, step: &StepRun, segment: &StepSegment) -> Vec<ErrorRecord> {
        if !step.is_failed() {
            return Vec::new();
        }
        self.extract_lines(&segment.lines)
    }

    /// Extract errors from raw lines regardless of step outcome.
    ///
    /// Every line is visited by the outer scan, including lines already
    /// consumed as stack frames, so one line may contribute to two records.
    pub fn extract_lines(&self, lines: &[LogLine]) -> Vec<ErrorRecord> {
        let mut records = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if let Some((kind, matched)) = self.signatures.classify(&line.text) {
                let mut record = ErrorRecord::new(kind, matched);
                self.collect_frames(lines, idx, &mut record);
                record.surrounding_context = self.context_window(lines, idx);
                records.push(record);
            }
        }
        records
    }

    fn collect_frames(&self, lines: &[LogLine], idx: usize, record: &mut ErrorRecord) {
        let end = (idx + 1 + self.config.lookahead_lines).min(lines.len());
        for line in &lines[idx + 1..end] {
            if let Some(frame) = self.frames.match_frame(&line.text) {
                record.stack_frames.push(line.text.trim().to_string());
                if record.file_path.is_none() {
                    record.file_path = Some(frame.file);
                    record.line_number = frame.line;
                }
            }
            // a blank line or the next error ends this trace
            if line.is_blank() || self.signatures.matches_any(&line.text) {
                break;
            }
        }
    }

    fn context_window(&self, lines: &[LogLine], idx: usize) -> Vec<String> {
        let start = idx.saturating_sub(self.config.context_before);
        let end = (idx + self.config.context_after + 1).min(lines.len());
        lines[start..end]
            .iter()
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// One-sentence description of the first error in a failed step.
    pub fn summarize(&self, step: &StepRun, segment: &StepSegment) -> String {
        self.summarize_errors(&step.name, &self.extract(step, segment))
    }

    /// Same as [`summarize`](Self::summarize) for already extracted errors.
    pub fn summarize_errors(&self, step_name: &str, errors: &[ErrorRecord]) -> String {
        let Some(error) = errors.first() else {
            return no_clear_error(step_name);
        };

        let mut parts = vec![
            format!("Step '{}' failed", step_name),
            format!("({})", error.error_type),
        ];
        if let Some(location) = error.location() {
            parts.push(format!("in {}", location));
        }
        let message: String = error
            .error_message
            .chars()
            .take(self.config.summary_message_chars)
            .collect();
        parts.push(format!("- {}", message));
        parts.join(" ")
    }
}

/// Summary used when a failed step yields no recognizable error.
pub fn no_clear_error(step_name: &str) -> String {
    format!("Step '{}' failed with no clear error message", step_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ci::diagnostic::ErrorKind;
    use crate::domain::ci::run::Conclusion;

    fn failed_step(name: &str) -> StepRun {
        StepRun::completed(2, name, Conclusion::Failure)
    }

    fn segment(text: &str) -> StepSegment {
        StepSegment::from_text(1, "test", text)
    }

    #[test]
    fn test_passing_step_yields_nothing() {
        let extractor = ErrorExtractor::default();
        let step = StepRun::completed(1, "build", Conclusion::Success);
        assert!(extractor
            .extract(&step, &segment("TypeError: x is undefined"))
            .is_empty());
    }

    #[test]
    fn test_no_signature_yields_empty_list() {
        let extractor = ErrorExtractor::default();
        let seg = segment("Running 12 tests\nall fine\nexit code 1");
        assert!(extractor.extract(&failed_step("test"), &seg).is_empty());
    }

    #[test]
    fn test_python_traceback_frames_and_location() {
        let extractor = ErrorExtractor::default();
        let log = "Traceback (most recent call last):\n\
                   ValueError: invalid literal for int()\n\
                   \x20 File \"app/parse.py\", line 41, in parse\n\
                   \x20 File \"app/main.py\", line 9, in main\n\
                   \n\
                   Process completed with exit code 1.";
        let errors = extractor.extract(&failed_step("test"), &segment(log));

        assert_eq!(errors.len(), 1);
        let err = &errors[0];
        assert_eq!(err.error_type, ErrorKind::RuntimeError);
        assert_eq!(err.error_message, "ValueError: invalid literal for int()");
        assert_eq!(err.file_path.as_deref(), Some("app/parse.py"));
        assert_eq!(err.line_number, Some(41));
        assert_eq!(
            err.stack_frames,
            vec![
                "File \"app/parse.py\", line 41, in parse",
                "File \"app/main.py\", line 9, in main",
            ]
        );
    }

    #[test]
    fn test_lookahead_stops_at_blank_line() {
        let extractor = ErrorExtractor::default();
        let log = "TypeError: boom\n    at run (src/a.js:3)\n\n    at main (src/b.js:9)";
        let errors = extractor.extract_lines(&segment(log).lines);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].stack_frames, vec!["at run (src/a.js:3)"]);
    }

    #[test]
    fn test_lookahead_stops_at_next_error() {
        let extractor = ErrorExtractor::default();
        let log = "error: first\nnpm ERR! second\n    src/lib.rs:4";
        let errors = extractor.extract_lines(&segment(log).lines);

        assert_eq!(errors.len(), 2);
        assert!(errors[0].stack_frames.is_empty());
        assert_eq!(errors[1].error_type, ErrorKind::PackageManagerError);
        assert_eq!(errors[1].file_path.as_deref(), Some("src/lib.rs"));
    }

    #[test]
    fn test_lookahead_is_bounded() {
        let extractor = ErrorExtractor::default();
        let mut lines = vec!["error: far frame".to_string()];
        for i in 0..20 {
            lines.push(format!("progress {}", i));
        }
        lines.push("    src/late.rs:1".to_string());
        let seg = StepSegment::new(0, "build", lines);

        let errors = extractor.extract_lines(&seg.lines);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].stack_frames.is_empty());
        assert!(errors[0].file_path.is_none());
    }

    #[test]
    fn test_frame_on_last_lookahead_line_is_collected() {
        let extractor = ErrorExtractor::default();
        let mut lines = vec!["error: near frame".to_string()];
        for i in 0..19 {
            lines.push(format!("progress {}", i));
        }
        lines.push("    src/edge.rs:20".to_string());
        let seg = StepSegment::new(0, "build", lines);

        let errors = extractor.extract_lines(&seg.lines);
        assert_eq!(errors[0].file_path.as_deref(), Some("src/edge.rs"));
        assert_eq!(errors[0].line_number, Some(20));
    }

    #[test]
    fn test_context_window_is_clamped_and_skips_blanks() {
        let extractor = ErrorExtractor::default();
        let mut lines: Vec<String> = (0..8).map(|i| format!("before {}", i)).collect();
        lines.push(String::new());
        lines.push("  error: here  ".to_string());
        for i in 0..12 {
            lines.push(format!("after {}", i));
        }
        let seg = StepSegment::new(0, "build", lines);

        let errors = extractor.extract_lines(&seg.lines);
        let ctx = &errors[0].surrounding_context;
        // 5 lines before (one blank dropped), the match, 10 after
        assert_eq!(ctx.len(), 4 + 1 + 10);
        assert_eq!(ctx[0], "before 4");
        assert_eq!(ctx[4], "error: here");
        assert_eq!(ctx.last().map(String::as_str), Some("after 9"));
    }

    #[test]
    fn test_frame_line_matching_a_signature_spawns_its_own_record() {
        let extractor = ErrorExtractor::default();
        let log = "error: outer\n    File \"x.py\", line 3, KeyError: 'k'";
        let errors = extractor.extract_lines(&segment(log).lines);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].file_path.as_deref(), Some("x.py"));
        assert_eq!(errors[1].error_type, ErrorKind::RuntimeError);
    }

    #[test]
    fn test_summary_with_location() {
        let extractor = ErrorExtractor::default();
        let log = "TypeError: x is undefined\n    at render (src/view.js:12)";
        let summary = extractor.summarize(&failed_step("unit tests"), &segment(log));
        assert_eq!(
            summary,
            "Step 'unit tests' failed (runtime_error) in src/view.js:12 - TypeError: x is undefined"
        );
    }

    #[test]
    fn test_summary_truncates_message() {
        let extractor = ErrorExtractor::default();
        let long = format!("error: {}", "x".repeat(300));
        let summary = extractor.summarize(&failed_step("build"), &segment(&long));
        let message = summary.split(" - ").nth(1).expect("message part");
        assert_eq!(message.chars().count(), 100);
    }

    #[test]
    fn test_summary_without_errors() {
        let extractor = ErrorExtractor::default();
        let summary = extractor.summarize(&failed_step("lint"), &segment("exit 1"));
        assert_eq!(summary, "Step 'lint' failed with no clear error message");
    }
}
