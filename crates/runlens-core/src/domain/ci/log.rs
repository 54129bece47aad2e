//! Log lines and per-step log segments.

use serde::{Deserialize, Serialize};

/// A single raw log line with its zero-based position inside a segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub index: usize,
    pub text: String,
}

impl LogLine {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Ordered log lines attributed to one step of a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepSegment {
    /// Zero-based position of the step within its job.
    pub step_index: usize,

    pub step_name: String,

    pub lines: Vec<LogLine>,
}

impl StepSegment {
    /// Build a segment, numbering the lines in the order given.
    pub fn new(step_index: usize, step_name: impl Into<String>, texts: Vec<String>) -> Self {
        let lines = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| LogLine { index, text })
            .collect();
        Self {
            step_index,
            step_name: step_name.into(),
            lines,
        }
    }

    /// Convenience constructor splitting raw text on line breaks.
    pub fn from_text(step_index: usize, step_name: impl Into<String>, text: &str) -> Self {
        Self::new(
            step_index,
            step_name,
            text.lines().map(str::to_string).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_numbered_from_zero() {
        let segment = StepSegment::from_text(2, "test", "first\nsecond\n\nfourth");
        assert_eq!(segment.len(), 4);
        let indices: Vec<usize> = segment.lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(segment.lines[3].text, "fourth");
        assert!(segment.lines[2].is_blank());
    }

    #[test]
    fn test_empty_segment() {
        let segment = StepSegment::new(0, "noop", Vec::new());
        assert!(segment.is_empty());
    }
}
