//! Error records extracted from failed step logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a recognized error signature.
///
/// Variants are declared in the fixed priority order used when a line matches
/// more than one signature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Named language-runtime error (`TypeError: ...`, `ValueError: ...`).
    RuntimeError,
    /// Test runner failure marker (`FAILED tests/x.py::test_y`).
    TestFailure,
    /// Compiler/build tool error (`error: ...`).
    BuildError,
    /// Package manager error (`npm ERR! ...`).
    PackageManagerError,
    /// TypeScript diagnostic (`TS2345: ...`).
    TypescriptError,
    /// Catch-all `Error: ...` phrasing.
    GenericError,
}

impl ErrorKind {
    /// All kinds in priority order.
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::RuntimeError,
        ErrorKind::TestFailure,
        ErrorKind::BuildError,
        ErrorKind::PackageManagerError,
        ErrorKind::TypescriptError,
        ErrorKind::GenericError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RuntimeError => "runtime_error",
            ErrorKind::TestFailure => "test_failure",
            ErrorKind::BuildError => "build_error",
            ErrorKind::PackageManagerError => "package_manager_error",
            ErrorKind::TypescriptError => "typescript_error",
            ErrorKind::GenericError => "generic_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured evidence for one error found in a step log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorRecord {
    /// Signature that matched.
    pub error_type: ErrorKind,

    /// Matched text from the error line.
    pub error_message: String,

    /// Source file from the first stack frame, if any.
    pub file_path: Option<String>,

    /// Line number from the first stack frame, if any.
    pub line_number: Option<u32>,

    /// Stack-frame lines in encounter order (trimmed).
    #[serde(default)]
    pub stack_frames: Vec<String>,

    /// Non-blank lines around the match, for display.
    #[serde(default)]
    pub surrounding_context: Vec<String>,
}

impl ErrorRecord {
    pub fn new(error_type: ErrorKind, error_message: impl Into<String>) -> Self {
        Self {
            error_type,
            error_message: error_message.into(),
            file_path: None,
            line_number: None,
            stack_frames: Vec::new(),
            surrounding_context: Vec::new(),
        }
    }

    /// Set the primary location.
    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file_path = Some(file.into());
        self.line_number = line;
        self
    }

    /// `file:line`, or just `file` when the line number is unknown.
    pub fn location(&self) -> Option<String> {
        let file = self.file_path.as_deref()?;
        Some(match self.line_number {
            Some(line) => format!("{}:{}", file, line),
            None => file.to_string(),
        })
    }
}
