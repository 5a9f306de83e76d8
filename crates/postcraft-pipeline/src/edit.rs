//! Interactive revision of a single post.

use std::fmt::Write as _;

use postcraft_core::{Platform, RuleSet};
use postcraft_llm::LanguageModel;
use serde::{Deserialize, Serialize};

use crate::agents::{ContentReply, EDITOR};
use crate::error::PipelineError;
use crate::format::enforce_rules;
use crate::metadata::{extract_post_metadata, PostMetadata};
use crate::scoring::{heuristic_virality, ViralityScore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub content: String,
    pub metadata: PostMetadata,
    pub score: ViralityScore,
    /// False when the model reply was unusable and the original text was kept.
    pub applied: bool,
}

/// Revise `current` according to `request`, then re-derive metadata and a heuristic score.
///
/// With a `platform`, the result is held to that platform's limits.
///
/// # Errors
///
/// - [`PipelineError::Validation`] if either text is blank.
/// - [`PipelineError::Model`] if the model call fails.
pub async fn edit_post<M: LanguageModel>(
    model: &M,
    rules: &RuleSet,
    current: &str,
    request: &str,
    platform: Option<Platform>,
) -> Result<EditOutcome, PipelineError> {
    if current.trim().is_empty() {
        return Err(PipelineError::Validation(
            "currentContent must not be empty".to_string(),
        ));
    }
    if request.trim().is_empty() {
        return Err(PipelineError::Validation(
            "editRequest must not be empty".to_string(),
        ));
    }

    let mut input = String::new();
    if let Some(platform) = platform {
        let limits = rules.get(platform);
        let _ = writeln!(
            input,
            "Platform: {} (max {} characters, {} hashtags)",
            platform.display_name(),
            limits.max_chars,
            limits.max_hashtags
        );
    }
    let _ = write!(input, "Request: {request}\n\nPost:\n{current}");

    let reply = EDITOR.invoke_json::<M, ContentReply>(model, input).await?;
    let (content, applied) = match ContentReply::non_empty(reply) {
        Some(revised) => (revised, true),
        None => (current.to_string(), false),
    };
    let content = match platform {
        Some(platform) => enforce_rules(&content, &rules.get(platform)),
        None => content,
    };

    let metadata = extract_post_metadata(&content);
    let score = heuristic_virality(&metadata);
    tracing::info!(
        applied,
        chars = content.chars().count(),
        score = score.virality_score,
        "post edited"
    );
    Ok(EditOutcome {
        content,
        metadata,
        score,
        applied,
    })
}
