//! Error types for runlens-remote

use runlens_core::RunlensError;
use thiserror::Error;

/// Errors raised by the remote adapters
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Required credential missing from the environment
    #[error("{0} environment variable is not set")]
    MissingCredential(&'static str),

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not decode
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Http(err.to_string())
    }
}

impl RemoteError {
    /// Map into the core error for failures of the history provider.
    pub fn into_provider_error(self) -> RunlensError {
        RunlensError::Provider(self.to_string())
    }

    /// Map into the core error for failures of the reasoning service.
    pub fn into_reasoning_error(self) -> RunlensError {
        RunlensError::Reasoning(self.to_string())
    }
}

/// Result type for remote adapter operations
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_display() {
        let err = RemoteError::MissingCredential("GITHUB_TOKEN");
        assert_eq!(err.to_string(), "GITHUB_TOKEN environment variable is not set");
    }

    #[test]
    fn test_status_maps_to_provider_error() {
        let err = RemoteError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let core = err.into_provider_error();
        assert!(matches!(core, RunlensError::Provider(ref m) if m.contains("502")));
    }

    #[test]
    fn test_status_maps_to_reasoning_error() {
        let core = RemoteError::Status {
            status: 529,
            body: "overloaded".to_string(),
        }
        .into_reasoning_error();
        assert!(matches!(core, RunlensError::Reasoning(_)));
    }
}
