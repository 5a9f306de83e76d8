//! Agents as configuration: a system prompt, a temperature and a reply mode.
//!
//! Every agent goes through the same invoke/parse/fallback routine. Transport
//! and rate-limit failures propagate; a reply that does not parse is reported
//! as `None` so the caller can substitute its fallback.

use postcraft_llm::{parse_json_reply, LanguageModel, LlmError, Prompt};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::prompts::{
    AGGREGATOR_PROMPT, EDITOR_PROMPT, FORMATTER_PROMPT, OPTIMIZER_PROMPT, SCORER_PROMPT,
    SUMMARIZER_PROMPT, TREND_ANALYST_PROMPT, WRITER_PROMPT,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSpec {
    pub name: &'static str,
    pub instructions: &'static str,
    pub temperature: f32,
    /// Whether the reply must contain a JSON object.
    pub json: bool,
}

pub const TREND_ANALYST: AgentSpec = AgentSpec {
    name: "trend_analyst",
    instructions: TREND_ANALYST_PROMPT,
    temperature: 0.4,
    json: true,
};

pub const SUMMARIZER: AgentSpec = AgentSpec {
    name: "summarizer",
    instructions: SUMMARIZER_PROMPT,
    temperature: 0.3,
    json: false,
};

pub const AGGREGATOR: AgentSpec = AgentSpec {
    name: "aggregator",
    instructions: AGGREGATOR_PROMPT,
    temperature: 0.3,
    json: false,
};

pub const WRITER: AgentSpec = AgentSpec {
    name: "writer",
    instructions: WRITER_PROMPT,
    temperature: 0.8,
    json: true,
};

pub const SCORER: AgentSpec = AgentSpec {
    name: "scorer",
    instructions: SCORER_PROMPT,
    temperature: 0.2,
    json: true,
};

pub const OPTIMIZER: AgentSpec = AgentSpec {
    name: "optimizer",
    instructions: OPTIMIZER_PROMPT,
    temperature: 0.7,
    json: true,
};

pub const FORMATTER: AgentSpec = AgentSpec {
    name: "formatter",
    instructions: FORMATTER_PROMPT,
    temperature: 0.3,
    json: true,
};

pub const EDITOR: AgentSpec = AgentSpec {
    name: "editor",
    instructions: EDITOR_PROMPT,
    temperature: 0.5,
    json: true,
};

impl AgentSpec {
    #[must_use]
    pub fn prompt(&self, input: impl Into<String>) -> Prompt {
        let prompt = Prompt::new(input)
            .with_system(self.instructions)
            .with_temperature(self.temperature);
        if self.json {
            prompt.json()
        } else {
            prompt
        }
    }

    /// Run the agent and return its trimmed free-text reply.
    ///
    /// # Errors
    ///
    /// Propagates [`LlmError`] from the model.
    pub async fn invoke_text<M: LanguageModel>(
        &self,
        model: &M,
        input: impl Into<String>,
    ) -> Result<String, LlmError> {
        let reply = model.complete(&self.prompt(input)).await?;
        Ok(reply.trim().to_string())
    }

    /// Run the agent and parse the JSON object in its reply.
    ///
    /// `Ok(None)` means the model answered but not in the expected shape.
    ///
    /// # Errors
    ///
    /// Propagates [`LlmError`] from the model, except an empty reply, which is `Ok(None)`.
    pub async fn invoke_json<M: LanguageModel, T: DeserializeOwned>(
        &self,
        model: &M,
        input: impl Into<String>,
    ) -> Result<Option<T>, LlmError> {
        let reply = match model.complete(&self.prompt(input)).await {
            Ok(reply) => reply,
            Err(LlmError::EmptyResponse) => {
                tracing::warn!(agent = self.name, "agent reply was empty; using fallback");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let parsed = parse_json_reply::<T>(&reply);
        if parsed.is_none() {
            tracing::warn!(
                agent = self.name,
                reply_chars = reply.chars().count(),
                "agent reply did not contain the expected JSON; using fallback"
            );
        }
        Ok(parsed)
    }
}

/// `{"content": "..."}`, the reply shape shared by writer, optimizer, formatter and editor.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentReply {
    pub content: String,
}

impl ContentReply {
    /// The content, or `None` if it is blank.
    pub(crate) fn non_empty(reply: Option<Self>) -> Option<String> {
        reply
            .map(|r| r.content.trim().to_string())
            .filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_agent_settings() {
        let prompt = WRITER.prompt("draft something");
        assert_eq!(prompt.system.as_deref(), Some(WRITER_PROMPT));
        assert!(prompt.json_mode);
        assert!((prompt.temperature - 0.8).abs() < f32::EPSILON);

        let prompt = SUMMARIZER.prompt("text");
        assert!(!prompt.json_mode);
    }

    #[test]
    fn trend_prompt_shows_the_full_reply_shape() {
        assert!(TREND_ANALYST_PROMPT.contains(r##""hashtags": ["#..."]"##));
        assert!(TREND_ANALYST_PROMPT.ends_with("who will care"));
    }

    #[test]
    fn content_reply_rejects_blank() {
        assert_eq!(
            ContentReply::non_empty(Some(ContentReply {
                content: "  hi ".to_string()
            })),
            Some("hi".to_string())
        );
        assert_eq!(
            ContentReply::non_empty(Some(ContentReply {
                content: "   ".to_string()
            })),
            None
        );
        assert_eq!(ContentReply::non_empty(None), None);
    }

    struct Silent;

    impl LanguageModel for Silent {
        async fn complete(&self, _prompt: &Prompt) -> Result<String, LlmError> {
            Err(LlmError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn empty_reply_is_a_parse_miss() {
        let reply = WRITER
            .invoke_json::<_, ContentReply>(&Silent, "draft")
            .await
            .unwrap();
        assert!(reply.is_none());
    }
}
