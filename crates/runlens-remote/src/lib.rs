//! runlens-remote: network adapters for runlens
//!
//! Implements the collaborator traits of `runlens-core` against real
//! services:
//!
//! - [`GitHubClient`]: GitHub Actions REST API as an `ExecutionHistoryProvider`
//! - [`AnthropicClient`]: Anthropic Messages API as a `ReasoningService`
//!
//! Each call is a single request with an explicit timeout; failures are
//! surfaced to the caller without retry.

pub mod anthropic;
pub mod error;
pub mod github;

pub use anthropic::{AnthropicClient, AnthropicConfig, DEFAULT_MODEL};
pub use error::{RemoteError, Result};
pub use github::{GitHubClient, GitHubConfig};

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("runlens/", env!("CARGO_PKG_VERSION"));
