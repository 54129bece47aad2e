//! Error taxonomy for the analysis pipeline.
//!
//! Extraction never fails and malformed reasoning replies are recovered by the
//! response interpreter, so the variants here only cover collaborator failures
//! and invalid configuration.

/// runlens domain errors.
#[derive(Debug, thiserror::Error)]
pub enum RunlensError {
    #[error("execution history provider error: {0}")]
    Provider(String),

    #[error("reasoning service error: {0}")]
    Reasoning(String),

    #[error("run not found: {0}")]
    RunNotFound(u64),

    #[error("invalid error signature '{name}': {source}")]
    InvalidSignature {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runlens domain operations.
pub type Result<T> = std::result::Result<T, RunlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = RunlensError::Provider("GET /jobs returned 502".to_string());
        assert!(err.to_string().contains("execution history provider error"));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_run_not_found_display() {
        let err = RunlensError::RunNotFound(42);
        assert_eq!(err.to_string(), "run not found: 42");
    }

    #[test]
    fn test_invalid_signature_keeps_source() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = RunlensError::InvalidSignature {
            name: "broken".to_string(),
            source,
        };
        assert!(err.to_string().contains("broken"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
