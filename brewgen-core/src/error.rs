use std::time::Duration;

use thiserror::Error;

use crate::engine::GenerationStage;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Owner id must not be empty")]
    MissingOwner,

    #[error("Batch size must be a positive number, got {0}")]
    InvalidBatchSize(f64),

    #[error("Beer style must not be empty")]
    MissingBeerStyle,
}

/// Failures of the completion round-trip, already classified.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("LLM is not configured: {0}")]
    Configuration(String),

    #[error("LLM rejected credentials: {0}")]
    Authentication(String),

    #[error("LLM rate limit exceeded")]
    RateLimit { retry_after: Option<Duration> },

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("LLM returned unusable output: {reason}")]
    MalformedOutput { reason: String, raw: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize recipe: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Everything that can stop a generation call.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service not configured: {0}")]
    Configuration(String),

    #[error("Authentication with the recipe model failed: {0}")]
    Authentication(String),

    #[error("Recipe model is rate limited")]
    RateLimit { retry_after: Option<Duration> },

    #[error("Recipe model failed: {0}")]
    Provider(String),

    #[error("Recipe model returned malformed output: {reason}")]
    MalformedOutput { reason: String },

    #[error("Recipe generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Recipe limit reached for this plan")]
    LimitReached,

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::Configuration(_) => "configuration_error",
            EngineError::Authentication(_) => "authentication_error",
            EngineError::RateLimit { .. } => "rate_limited",
            EngineError::Provider(_) => "provider_error",
            EngineError::MalformedOutput { .. } => "malformed_output",
            EngineError::Timeout(_) => "timeout",
            EngineError::LimitReached => "limit_reached",
            EngineError::Store(_) => "storage_error",
        }
    }
}

impl From<GatewayError> for EngineError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Configuration(msg) => EngineError::Configuration(msg),
            GatewayError::Authentication(msg) => EngineError::Authentication(msg),
            GatewayError::RateLimit { retry_after } => EngineError::RateLimit { retry_after },
            GatewayError::Provider(msg) => EngineError::Provider(msg),
            GatewayError::MalformedOutput { reason, .. } => EngineError::MalformedOutput { reason },
        }
    }
}

/// A failed generation together with the stage it stopped in.
#[derive(Error, Debug)]
#[error("{error} (at stage {stage:?})")]
pub struct GenerationFailure {
    pub stage: GenerationStage,
    pub trail: Vec<GenerationStage>,
    #[source]
    pub error: EngineError,
}
