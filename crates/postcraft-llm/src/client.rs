//! HTTP client for an OpenAI-compatible `chat/completions` endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::LlmError;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Prompt, ResponseFormat};
use crate::LanguageModel;

/// Longest slice of an error body kept in [`LlmError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Chat-completions client.
///
/// Holds the HTTP client, API key, model name and retry policy. Use
/// [`LlmClient::new`] with the configured base URL; tests pass a wiremock URI.
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
    retry: RetryPolicy,
}

impl LlmClient {
    /// Creates a client for `base_url` (e.g. `https://generativelanguage.googleapis.com/v1beta/openai/`).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`LlmError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("postcraft/0.1")
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|u| u.join("chat/completions"))
            .map_err(|e| LlmError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            model: model.to_owned(),
            retry,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` and returns the first choice's text, retrying on 429.
    ///
    /// # Errors
    ///
    /// - [`LlmError::RateLimited`] once retries are exhausted.
    /// - [`LlmError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::Deserialize`] / [`LlmError::EmptyResponse`] on a malformed body.
    pub async fn chat(&self, prompt: &Prompt) -> Result<String, LlmError> {
        retry_with_backoff(self.retry, || self.send_once(prompt)).await
    }

    async fn send_once(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: prompt.temperature,
            response_format: prompt.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::UnexpectedStatus {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let text = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Deserialize {
                context: format!("chat completion from {}", self.model),
                source: e,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(model = %self.model, chars = content.len(), "model call completed");
        Ok(content)
    }
}

impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.chat(prompt).await
    }
}
