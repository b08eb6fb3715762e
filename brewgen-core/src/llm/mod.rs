//! LLM provider abstraction for recipe generation.
//!
//! This module provides a trait-based abstraction over the completion APIs
//! (OpenAI-compatible, Claude) plus a fake provider for tests.

mod claude;
mod fake;
mod openai;
mod types;

pub use claude::ClaudeProvider;
pub use fake::FakeProvider;
pub use openai::OpenAiProvider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{LlmConfig, ProviderKind};

/// Error type for LLM operations.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. Each call is exactly
/// one request to the backing service; retrying is the caller's decision.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a chat request and get the model's text response.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Get the provider name (e.g., "claude", "openai", "fake").
    fn provider_name(&self) -> &'static str;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// Stand-in used when configuration failed at startup. Every call reports
/// the configuration problem.
#[derive(Debug)]
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "unconfigured"
    }

    fn model_name(&self) -> &str {
        ""
    }
}

/// Build the provider described by a configuration.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    match config.provider {
        ProviderKind::OpenAi | ProviderKind::OpenRouter => Arc::new(OpenAiProvider::new(
            config.provider.name(),
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )),
        ProviderKind::Claude => Arc::new(ClaudeProvider::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )),
        ProviderKind::Fake => Arc::new(FakeProvider::default()),
    }
}

/// Turn a non-success HTTP response into an error.
///
/// `error_message` extracts the provider's message from a JSON error body.
pub(crate) fn error_from_status(
    status: u16,
    retry_after: Option<&str>,
    body: String,
    error_message: impl Fn(&str) -> Option<String>,
) -> LlmError {
    if status == 429 {
        return LlmError::RateLimited {
            retry_after_secs: retry_after.and_then(|v| v.trim().parse().ok()),
        };
    }
    let message = error_message(&body).unwrap_or(body);
    LlmError::ApiError { status, message }
}
