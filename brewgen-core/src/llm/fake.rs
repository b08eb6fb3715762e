//! Fake LLM provider for testing.
//!
//! This provider returns deterministic responses based on prompt matching,
//! allowing tests to run without network access or API costs.

use super::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Canned draft returned by [`FakeProvider::default`].
pub const SAMPLE_DRAFT: &str = r#"{
  "name": "Sample Pale Ale",
  "description": "A balanced, easy-drinking pale ale.",
  "specs": {"og": "1.050", "fg": "1.011", "abv": "5.1%", "ibu": "35", "srm": "7"},
  "conditioning_days_min": 10,
  "conditioning_days_max": 21,
  "malts": [
    {"name": "Pale Ale malt", "amount": "4.2 kg", "explanation": "Base malt"},
    {"name": "Crystal 40", "amount": "300 g", "explanation": "Color and caramel"}
  ],
  "hops": [
    {"name": "Magnum", "amount": "15 g", "time": "60 min", "boil_time": 60, "alpha": 12.5, "explanation": "Bittering"},
    {"name": "Cascade", "amount": "30 g", "time": "10 min", "boil_time": 10, "alpha": 6.0, "explanation": "Flavor"}
  ],
  "yeast": {"name": "SafAle US-05", "type": "dry", "amount": "1 packet"},
  "extras": [],
  "mash_schedule": [{"step": "Saccharification Rest", "temp": "66°C", "time": "60 min", "description": "Balanced body"}],
  "fermentation_instructions": ["Pitch at 18°C and hold for 10 days."],
  "fermentationSchedule": [{"step": "Primary", "temp": "18°C", "duration": "10 days"}],
  "shopping_list": ["Pale Ale malt 4.2 kg", "Crystal 40 300 g", "Magnum 15 g", "Cascade 30 g", "SafAle US-05"]
}"#;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(LlmError),
}

/// A fake LLM provider for testing.
///
/// Responses are matched by checking if the user prompt contains a registered
/// substring. If no match is found, returns the default reply or an error.
#[derive(Debug)]
pub struct FakeProvider {
    /// Prompt substring -> reply, checked in insertion order.
    responses: RwLock<Vec<(String, Reply)>>,
    default_reply: Option<Reply>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: RwLock<Option<ChatRequest>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new().with_default_response(SAMPLE_DRAFT)
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(Vec::new()),
            default_reply: None,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: RwLock::new(None),
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// A provider that answers every prompt with `response`.
    pub fn always(response: &str) -> Self {
        Self::new().with_default_response(response)
    }

    /// A provider that fails every call with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self {
            default_reply: Some(Reply::Fail(error)),
            ..Self::new()
        }
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((prompt_contains.to_lowercase(), Reply::Text(response.to_string())));
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_reply = Some(Reply::Text(response.to_string()));
        self
    }

    /// Sleep before answering, for timeout tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completed or failed calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.write().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let prompt: String = request
            .conversation()
            .map(|m| m.content.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");

        let matched = self
            .responses
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match matched.or_else(|| self.default_reply.clone()) {
            Some(Reply::Text(text)) => Ok(ChatResponse::text(text)),
            Some(Reply::Fail(error)) => Err(error),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
