//! Anthropic Messages API reasoning service

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use runlens_core::ReasoningService;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RemoteError, Result};
use crate::USER_AGENT;

pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const ANTHROPIC_MODEL_VAR: &str = "ANTHROPIC_MODEL";
pub const ANTHROPIC_API_URL_VAR: &str = "ANTHROPIC_API_URL";

/// Anthropic connection settings
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API base URL, without trailing slash
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicConfig {
    pub fn new(api_key: &str) -> Self {
        AnthropicConfig {
            api_url: DEFAULT_ANTHROPIC_API_URL.to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from an API key read from the environment or the command line.
    /// A missing or empty key is a [`RemoteError::MissingCredential`].
    pub fn from_api_key(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(RemoteError::MissingCredential(ANTHROPIC_API_KEY_VAR))?;
        Ok(Self::new(&api_key))
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_url)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks; other block types are skipped.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect()
    }
}

/// Anthropic client implementing [`ReasoningService`]
pub struct AnthropicClient {
    config: AnthropicConfig,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(AnthropicClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Anthropic request"
        );
        let response = self
            .http_client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // an empty reply is left to the interpreter's fallback
        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let text = parsed.text();
        if text.is_empty() {
            warn!(model = %self.config.model, "Anthropic reply carried no text content");
        }
        Ok(text)
    }
}

#[async_trait]
impl ReasoningService for AnthropicClient {
    async fn complete(&self, prompt: &str) -> runlens_core::Result<String> {
        self.send(prompt)
            .await
            .map_err(RemoteError::into_reasoning_error)
    }
}
