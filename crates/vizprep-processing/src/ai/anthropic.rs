//! Anthropic Messages API provider.
//!
//! This module provides the [`AnthropicProvider`] which implements the
//! [`LlmProvider`] trait for the Anthropic API (<https://docs.anthropic.com/>).

use super::LlmProvider;
use crate::error::{PreprocessingError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Messages API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default model for chart suggestions.
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// API version sent in the `anthropic-version` header.
const API_VERSION: &str = "2023-06-01";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default max tokens for responses.
const DEFAULT_MAX_TOKENS: u32 = 8000;

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
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AnthropicConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnthropicConfigBuilder {
        AnthropicConfigBuilder::default()
    }
}

/// Builder for [`AnthropicConfig`].
#[derive(Default)]
pub struct AnthropicConfigBuilder {
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl AnthropicConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Anthropic provider backed by a blocking HTTP client.
///
/// # Example
///
/// ```rust,ignore
/// use vizprep_processing::ai::{AnthropicConfig, AnthropicProvider};
///
/// // Simple usage with defaults
/// let provider = AnthropicProvider::new(std::env::var("ANTHROPIC_API_KEY")?)?;
///
/// // With custom configuration
/// let config = AnthropicConfig::builder().timeout_secs(20).max_tokens(2000).build();
/// let provider = AnthropicProvider::with_config("your-api-key", config)?;
/// ```
pub struct AnthropicProvider {
    api_key: String,
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, AnthropicConfig::default())
    }

    /// Create a new provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot
    /// be created.
    pub fn with_config(api_key: impl Into<String>, config: AnthropicConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PreprocessingError::AiClientError(
                "API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    fn transport_error(&self, e: reqwest::Error) -> PreprocessingError {
        if e.is_timeout() {
            warn!("Anthropic request timed out after {}s", self.config.timeout_secs);
            PreprocessingError::AiTimeout(self.config.timeout_secs)
        } else {
            PreprocessingError::AiClientError(format!("request failed: {}", e))
        }
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let result: MessagesResponse = response.json().map_err(|e| self.transport_error(e))?;
        extract_text(result)
    }
}

fn status_error(status: StatusCode, body: &str) -> PreprocessingError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());
    PreprocessingError::AiClientError(format!("Anthropic API error {}: {}", status, message))
}

/// Concatenate the text blocks of a response.
fn extract_text(response: MessagesResponse) -> Result<String> {
    let text: String = response
        .content
        .unwrap_or_default()
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(PreprocessingError::AiClientError(
            "No response content from Anthropic API".to_string(),
        ));
    }
    Ok(text.trim().to_string())
}

impl LlmProvider for AnthropicProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Sending {} character prompt to {}", prompt.len(), self.config.model);
        self.call_api(prompt)
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================
