//! Completion gateway: one model call per generation, with classified errors.

use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::GatewayError;
use crate::llm::{ChatMessage, ChatRequest, LlmError, LlmProvider};
use crate::prompts::ComposedPrompt;
use crate::types::Recipe;

/// How much of a malformed response is kept for logging.
const RAW_LOG_LIMIT: usize = 2000;

/// Sampling parameters sent with every completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: crate::config::DEFAULT_TEMPERATURE,
            max_output_tokens: crate::config::DEFAULT_MAX_TOKENS,
        }
    }
}

impl From<&LlmConfig> for ModelParameters {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionGateway {
    provider: Arc<dyn LlmProvider>,
    parameters: ModelParameters,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, parameters: ModelParameters) -> Self {
        Self {
            provider,
            parameters,
        }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Send the prompt and return the raw model text. Never retries.
    pub async fn complete(&self, prompt: &ComposedPrompt) -> Result<String, GatewayError> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(prompt.system_text.clone()),
                ChatMessage::user(prompt.user_text.clone()),
            ],
            max_tokens: Some(self.parameters.max_output_tokens),
            temperature: Some(self.parameters.temperature),
            json_response: true,
        };

        tracing::debug!(
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            "Requesting recipe completion"
        );

        let response = self.provider.complete(&request).await.map_err(classify)?;

        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Completion received"
        );

        if response.content.trim().is_empty() {
            return Err(GatewayError::MalformedOutput {
                reason: "empty response".to_string(),
                raw: String::new(),
            });
        }
        Ok(response.content)
    }
}

/// Map a provider error onto the gateway taxonomy.
pub fn classify(error: LlmError) -> GatewayError {
    match error {
        LlmError::NotConfigured(msg) => GatewayError::Configuration(msg),
        LlmError::RateLimited { retry_after_secs } => GatewayError::RateLimit {
            retry_after: retry_after_secs.map(Duration::from_secs),
        },
        LlmError::ApiError { status: 401 | 403, message } => GatewayError::Authentication(message),
        LlmError::ApiError { status: 429, .. } => GatewayError::RateLimit { retry_after: None },
        LlmError::ApiError { status, message } => {
            GatewayError::Provider(format!("HTTP {status}: {message}"))
        }
        LlmError::RequestFailed(msg) | LlmError::ParseError(msg) => GatewayError::Provider(msg),
    }
}

/// Extract the JSON object from model text.
///
/// Accepts a bare object, a fenced block with or without a language tag, or
/// an object surrounded by prose. Returns `None` when no braces are found.
pub fn extract_json(raw: &str) -> Option<&str> {
    let text = raw.trim();
    let text = strip_fence(text).unwrap_or(text);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn strip_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip an optional language tag on the fence line.
    let body = match after.split_once('\n') {
        Some((tag, rest)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => rest,
        _ => after,
    };
    let close = body.rfind("```").unwrap_or(body.len());
    Some(body[..close].trim())
}

fn truncate(raw: &str) -> String {
    if raw.len() <= RAW_LOG_LIMIT {
        return raw.to_string();
    }
    let mut end = RAW_LOG_LIMIT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}

/// Parse model text into a draft recipe.
pub fn parse_draft(raw: &str) -> Result<Recipe, GatewayError> {
    let malformed = |reason: String| {
        tracing::warn!(reason = %reason, raw = %truncate(raw), "Malformed recipe output");
        GatewayError::MalformedOutput {
            reason,
            raw: truncate(raw),
        }
    };

    let json = extract_json(raw).ok_or_else(|| malformed("no JSON object found".to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("top-level JSON is not an object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;

    fn prompt() -> ComposedPrompt {
        ComposedPrompt {
            system_text: "system".to_string(),
            user_text: "Create a Pale Ale recipe.".to_string(),
        }
    }

    fn gateway(provider: FakeProvider) -> CompletionGateway {
        CompletionGateway::new(Arc::new(provider), ModelParameters::default())
    }

    #[test]
    fn test_status_mapping() {
        let api = |status| LlmError::ApiError {
            status,
            message: "nope".to_string(),
        };
        assert!(matches!(classify(api(401)), GatewayError::Authentication(_)));
        assert!(matches!(classify(api(403)), GatewayError::Authentication(_)));
        assert!(matches!(classify(api(429)), GatewayError::RateLimit { .. }));
        assert!(matches!(classify(api(500)), GatewayError::Provider(_)));
        assert!(matches!(classify(api(400)), GatewayError::Provider(_)));
        assert!(matches!(
            classify(LlmError::NotConfigured("no key".to_string())),
            GatewayError::Configuration(_)
        ));
        assert!(matches!(
            classify(LlmError::RequestFailed("dns".to_string())),
            GatewayError::Provider(_)
        ));
        assert!(matches!(
            classify(LlmError::RateLimited {
                retry_after_secs: Some(12)
            }),
            GatewayError::RateLimit {
                retry_after: Some(d)
            } if d == Duration::from_secs(12)
        ));
    }

    #[test]
    fn test_fence_variants() {
        let bare = r#"{"name": "A"}"#;
        let fenced = "```\n{\"name\": \"A\"}\n```";
        let tagged = "```json\n{\"name\": \"A\"}\n```";
        let prose = "Here is your recipe:\n```json\n{\"name\": \"A\"}\n```\nEnjoy!";
        let unfenced_prose = "Sure! {\"name\": \"A\"} Cheers.";
        let inline = "```{\"name\": \"A\"}```";
        for raw in [bare, fenced, tagged, prose, unfenced_prose, inline] {
            assert_eq!(extract_json(raw), Some(r#"{"name": "A"}"#), "{raw}");
        }
    }

    #[test]
    fn test_nested_braces_kept() {
        let raw = "```json\n{\"specs\": {\"og\": \"1.050\"}}\n```";
        let recipe = parse_draft(raw).unwrap();
        assert_eq!(recipe.specs.og, "1.050");
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_draft("I'm sorry, I can't help with that.").unwrap_err();
        match err {
            GatewayError::MalformedOutput { raw, .. } => assert!(raw.contains("sorry")),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(
            parse_draft("{\"name\": \"A\",,}"),
            Err(GatewayError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_raw_truncated() {
        let long = "x".repeat(RAW_LOG_LIMIT * 2);
        match parse_draft(&long).unwrap_err() {
            GatewayError::MalformedOutput { raw, .. } => assert!(raw.len() <= RAW_LOG_LIMIT + 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_sends_parameters() {
        let provider = Arc::new(FakeProvider::always("{\"name\": \"A\"}"));
        let gateway = CompletionGateway::new(
            provider.clone(),
            ModelParameters {
                temperature: 0.3,
                max_output_tokens: 1000,
            },
        );
        let raw = gateway.complete(&prompt()).await.unwrap();
        assert_eq!(raw, "{\"name\": \"A\"}");

        let sent = provider.last_request().unwrap();
        assert_eq!(sent.temperature, Some(0.3));
        assert_eq!(sent.max_tokens, Some(1000));
        assert!(sent.json_response);
        assert_eq!(sent.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_response_is_malformed() {
        let err = gateway(FakeProvider::always("   ")).complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn test_provider_error_classified() {
        let err = gateway(FakeProvider::failing(LlmError::ApiError {
            status: 401,
            message: "invalid key".to_string(),
        }))
        .complete(&prompt())
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::Authentication(msg) if msg == "invalid key"));
    }
}
