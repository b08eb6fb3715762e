//! Configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com/v1";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_FREE_RECIPE_LIMIT: usize = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
}

/// Which completion API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
    Claude,
    Fake,
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Claude => "claude",
            ProviderKind::Fake => "fake",
        }
    }

    fn api_key_var(self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::Claude => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Fake => None,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi | ProviderKind::Fake => DEFAULT_OPENAI_BASE_URL,
            ProviderKind::OpenRouter => DEFAULT_OPENROUTER_BASE_URL,
            ProviderKind::Claude => DEFAULT_CLAUDE_BASE_URL,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
            ProviderKind::OpenRouter => DEFAULT_OPENROUTER_MODEL,
            ProviderKind::Claude => DEFAULT_CLAUDE_MODEL,
            ProviderKind::Fake => "fake-model",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "fake" => Ok(ProviderKind::Fake),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Completion service configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// Empty for the fake provider.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENAI_API_KEY`, `OPENROUTER_API_KEY` or `ANTHROPIC_API_KEY`, matching the provider
    ///
    /// Optional:
    /// - `BREWGEN_LLM_PROVIDER`: "openai" | "openrouter" | "claude" | "fake" (default: "openai")
    /// - `BREWGEN_LLM_MODEL`: Model name (provider-specific default)
    /// - `BREWGEN_LLM_BASE_URL`: API base URL (provider-specific default)
    /// - `BREWGEN_LLM_TEMPERATURE`: Sampling temperature (default: 0.7)
    /// - `BREWGEN_LLM_MAX_TOKENS`: Output token limit (default: 8192)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = match lookup("BREWGEN_LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderKind::OpenAi,
        };

        let api_key = match provider.api_key_var() {
            Some(var) => lookup(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))?,
            None => String::new(),
        };

        let model = lookup("BREWGEN_LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let base_url = lookup("BREWGEN_LLM_BASE_URL")
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let temperature = parse_var(&lookup, "BREWGEN_LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                name: "BREWGEN_LLM_TEMPERATURE".to_string(),
                value: temperature.to_string(),
            });
        }
        let max_tokens = parse_var(&lookup, "BREWGEN_LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            temperature,
            max_tokens,
        })
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on the completion call.
    pub generation_timeout: Duration,
    /// Stored recipes allowed per owner on the free plan.
    pub free_recipe_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            free_recipe_limit: DEFAULT_FREE_RECIPE_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `BREWGEN_GENERATION_TIMEOUT_SECS`: Completion timeout (default: 60)
    /// - `BREWGEN_FREE_RECIPE_LIMIT`: Saved recipes per owner (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = parse_var(
            &lookup,
            "BREWGEN_GENERATION_TIMEOUT_SECS",
            DEFAULT_GENERATION_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BREWGEN_GENERATION_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
            });
        }
        let free_recipe_limit =
            parse_var(&lookup, "BREWGEN_FREE_RECIPE_LIMIT", DEFAULT_FREE_RECIPE_LIMIT)?;

        Ok(Self {
            generation_timeout: Duration::from_secs(timeout_secs),
            free_recipe_limit,
        })
    }
}
