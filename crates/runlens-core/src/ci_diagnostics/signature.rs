//! Error signatures and stack-frame patterns.
//!
//! Both tables are ordered: the first entry that matches a line wins.

use regex::{Regex, RegexBuilder};

use crate::domain::ci::diagnostic::ErrorKind;
use crate::domain::{Result, RunlensError};

/// Built-in signatures in priority order. Specific runtime and test markers
/// come before the generic `Error:` phrasing.
const BUILTIN_SIGNATURES: &[(ErrorKind, &str)] = &[
    (ErrorKind::RuntimeError, r"(?P<type>\w+Error): (?P<message>.+)"),
    (ErrorKind::TestFailure, r"FAILED .+::(?P<test>\w+)"),
    (ErrorKind::BuildError, r"error: (?P<message>.+)"),
    (ErrorKind::PackageManagerError, r"npm ERR! (?P<message>.+)"),
    (ErrorKind::TypescriptError, r"TS\d+: (?P<message>.+)"),
    (ErrorKind::GenericError, r"Error: (?P<message>.+)"),
];

/// Built-in stack-frame shapes, anchored at line start.
const BUILTIN_FRAMES: &[&str] = &[
    // Python: `  File "app/main.py", line 12, in run`
    r#"^\s+File "(?P<file>.+)", line (?P<line>\d+)"#,
    // JavaScript: `    at handler (src/index.js:40)`
    r"^\s+at .+ \((?P<file>.+):(?P<line>\d+)",
    // Generic: `    src/lib.rs:88`
    r"^\s+(?P<file>[\w/.-]+):(?P<line>\d+)",
];

/// A named error category plus the case-insensitive rule recognizing it.
#[derive(Debug, Clone)]
pub struct ErrorSignature {
    kind: ErrorKind,
    pattern: Regex,
}

impl ErrorSignature {
    pub fn new(kind: ErrorKind, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RunlensError::InvalidSignature {
                name: kind.as_str().to_string(),
                source,
            })?;
        Ok(Self { kind, pattern })
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Matched text of the first occurrence in `line`.
    pub fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern.find(line).map(|m| m.as_str())
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Ordered, immutable list of error signatures.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    signatures: Vec<ErrorSignature>,
}

impl SignatureTable {
    pub fn new(signatures: Vec<ErrorSignature>) -> Self {
        Self { signatures }
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        let signatures = BUILTIN_SIGNATURES
            .iter()
            .filter_map(|(kind, pattern)| ErrorSignature::new(*kind, pattern).ok())
            .collect();
        Self { signatures }
    }

    /// First signature (by priority) matching `line`, with the matched text.
    pub fn classify<'a>(&self, line: &'a str) -> Option<(ErrorKind, &'a str)> {
        self.signatures
            .iter()
            .find_map(|sig| sig.find(line).map(|text| (sig.kind(), text)))
    }

    pub fn matches_any(&self, line: &str) -> bool {
        self.signatures.iter().any(|sig| sig.is_match(line))
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.signatures.iter().map(ErrorSignature::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Location captured from a stack-frame line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLocation {
    pub file: String,
    pub line: Option<u32>,
}

/// Ordered stack-frame recognizers.
#[derive(Debug, Clone)]
pub struct FrameMatcher {
    patterns: Vec<Regex>,
}

impl FrameMatcher {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn builtin() -> Self {
        let patterns = BUILTIN_FRAMES
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }

    /// Location from the first pattern matching `line`.
    pub fn match_frame(&self, line: &str) -> Option<FrameLocation> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(line)?;
            let file = caps.name("file")?.as_str().to_string();
            let line = caps.name("line").and_then(|m| m.as_str().parse().ok());
            Some(FrameLocation { file, line })
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for FrameMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_compile_completely() {
        let table = SignatureTable::builtin();
        assert_eq!(table.kinds(), ErrorKind::ALL.to_vec());
        assert_eq!(FrameMatcher::builtin().len(), BUILTIN_FRAMES.len());
    }

    #[test]
    fn test_runtime_error_beats_generic() {
        let table = SignatureTable::builtin();
        let (kind, text) = table
            .classify("Traceback: ValueError: invalid literal")
            .expect("match");
        assert_eq!(kind, ErrorKind::RuntimeError);
        assert_eq!(text, "ValueError: invalid literal");
    }

    #[test]
    fn test_classify_each_category() {
        let table = SignatureTable::builtin();
        let cases = [
            ("FAILED tests/test_api.py::test_login - assert 1 == 2", ErrorKind::TestFailure),
            ("error: could not compile `widgets`", ErrorKind::BuildError),
            ("npm ERR! code ELIFECYCLE", ErrorKind::PackageManagerError),
            ("src/app.ts(3,1): TS2304: Cannot find name 'foo'.", ErrorKind::TypescriptError),
        ];
        for (line, expected) in cases {
            let (kind, _) = table.classify(line).expect(line);
            assert_eq!(kind, expected, "{line}");
        }
    }

    #[test]
    fn test_signatures_are_case_insensitive() {
        let table = SignatureTable::builtin();
        let (kind, text) = table.classify("ERROR: linker failed").expect("match");
        assert_eq!(kind, ErrorKind::BuildError);
        assert_eq!(text, "ERROR: linker failed");
    }

    #[test]
    fn test_generic_error_only_signature_table() {
        let table = SignatureTable::new(vec![
            ErrorSignature::new(ErrorKind::GenericError, r"Error: (?P<message>.+)").expect("valid")
        ]);
        let (kind, _) = table.classify("Uncaught Error: boom").expect("match");
        assert_eq!(kind, ErrorKind::GenericError);
    }

    #[test]
    fn test_unmatched_line() {
        let table = SignatureTable::builtin();
        assert!(table.classify("Compiling widgets v0.1.0").is_none());
        assert!(!table.matches_any("all good"));
    }

    #[test]
    fn test_invalid_signature_pattern_is_rejected() {
        let err = ErrorSignature::new(ErrorKind::GenericError, "(oops").unwrap_err();
        assert!(matches!(err, RunlensError::InvalidSignature { .. }));
    }

    #[test]
    fn test_frame_shapes() {
        let frames = FrameMatcher::builtin();

        let py = frames
            .match_frame(r#"  File "app/main.py", line 12, in run"#)
            .expect("python frame");
        assert_eq!(py.file, "app/main.py");
        assert_eq!(py.line, Some(12));

        let js = frames
            .match_frame("    at handler (src/index.js:40)")
            .expect("js frame");
        assert_eq!(js.file, "src/index.js");
        assert_eq!(js.line, Some(40));

        let generic = frames.match_frame("    src/lib.rs:88").expect("generic frame");
        assert_eq!(generic.file, "src/lib.rs");
        assert_eq!(generic.line, Some(88));
    }

    #[test]
    fn test_frames_require_indentation() {
        let frames = FrameMatcher::builtin();
        assert!(frames.match_frame("src/lib.rs:88").is_none());
        assert!(frames.match_frame("").is_none());
    }
}
