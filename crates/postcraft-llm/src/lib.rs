//! Client for an OpenAI-compatible chat-completions API.
//!
//! Production points it at Gemini's OpenAI-compatible surface. The pipeline
//! only depends on the [`LanguageModel`] trait, so tests substitute a scripted
//! model without any HTTP.

pub mod client;
pub mod error;
pub mod json;
pub mod retry;
pub mod types;

use std::future::Future;

pub use client::LlmClient;
pub use error::LlmError;
pub use json::{extract_json_object, parse_json_reply};
pub use retry::{backoff_delay, RetryPolicy};
pub use types::Prompt;

/// Anything that can turn a prompt into free text.
pub trait LanguageModel: Send + Sync {
    /// Run one completion and return the assistant's text.
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl<M: LanguageModel> LanguageModel for std::sync::Arc<M> {
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String, LlmError>> + Send {
        (**self).complete(prompt)
    }
}
