//! Splits a job's raw log into per-step segments.
//!
//! CI providers stream every step of a job into one log. Each step's output
//! opens with a boundary marker line (`##[group]` on GitHub Actions), so the
//! text accumulated before a marker belongs to the step preceding it.

use crate::domain::ci::log::StepSegment;

/// Boundary marker emitted by GitHub Actions at the start of each step.
pub const DEFAULT_STEP_MARKER: &str = "##[group]";

/// Marker-driven log segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSegmenter {
    marker: String,
}

impl Default for LogSegmenter {
    fn default() -> Self {
        Self::with_marker(DEFAULT_STEP_MARKER)
    }
}

impl LogSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom boundary marker (matched as a substring of the line).
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Partition `raw_log` into segments aligned with `step_names`.
    ///
    /// Content before the first marker is dropped. Markers seen after every
    /// known step has been opened are kept as ordinary content of the last
    /// step. A log without markers yields no segments.
    pub fn segment(&self, raw_log: &str, step_names: &[String]) -> Vec<StepSegment> {
        let mut segments = Vec::new();
        let mut step_idx = 0usize;
        let mut buffer: Vec<String> = Vec::new();

        for line in raw_log.lines() {
            if step_idx < step_names.len() && line.contains(self.marker.as_str()) {
                if step_idx > 0 && !buffer.is_empty() {
                    let previous = step_idx - 1;
                    segments.push(StepSegment::new(
                        previous,
                        step_names[previous].clone(),
                        std::mem::take(&mut buffer),
                    ));
                }
                buffer.clear();
                step_idx += 1;
            }
            buffer.push(line.to_string());
        }

        if step_idx > 0 && !buffer.is_empty() {
            let last = step_idx - 1;
            segments.push(StepSegment::new(last, step_names[last].clone(), buffer));
        }

        tracing::debug!(
            steps = step_names.len(),
            segments = segments.len(),
            "segmented job log"
        );
        segments
    }
}
