//! One async function per model-backed stage.
//!
//! Each returns `Err` only for failures that should end the run. Replies that
//! do not parse are recovered here with the stage's fallback.

use std::fmt::Write as _;

use postcraft_core::{Platform, PlatformRules, PostStyle, ScoringMode};
use postcraft_llm::{LanguageModel, LlmError};

use crate::agents::{ContentReply, AGGREGATOR, FORMATTER, OPTIMIZER, SCORER, SUMMARIZER, TREND_ANALYST, WRITER};
use crate::batch::{split_content_into_batches, BatchOptions};
use crate::error::PipelineError;
use crate::events::TrendInsights;
use crate::format::{enforce_rules, truncate_chars};
use crate::metadata::extract_post_metadata;
use crate::queue::WorkQueue;
use crate::scoring::{heuristic_virality, ModelScoreReply, ScoringWeights, ViralityScore};

/// Criteria below this (0–10) are flagged to the optimizer.
const LOW_CRITERION: f64 = 7.0;

/// Text placed in a variant whose generation reply could not be parsed.
#[must_use]
pub fn placeholder_post(platform: Platform, style: PostStyle) -> String {
    format!("[Draft unavailable for {platform} ({style})]")
}

/// Ask the trend analyst about the opening `max_chars` of the content.
pub(crate) async fn analyze_trends<M: LanguageModel>(
    model: &M,
    title: Option<&str>,
    content: &str,
    max_chars: usize,
) -> Result<TrendInsights, LlmError> {
    let mut input = String::new();
    if let Some(title) = title {
        let _ = writeln!(input, "Title: {title}\n");
    }
    input.push_str(&truncate_chars(content, max_chars));

    let insights = TREND_ANALYST
        .invoke_json::<M, TrendInsights>(model, input)
        .await?
        .unwrap_or_default();
    tracing::debug!(
        topics = insights.topics.len(),
        hashtags = insights.hashtags.len(),
        "trend analysis finished"
    );
    Ok(insights)
}

/// A summary and how many batches produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Summary {
    pub text: String,
    pub batches: usize,
}

/// Summarize directly, or split into batches, summarize each and aggregate.
pub(crate) async fn summarize<M: LanguageModel>(
    model: &M,
    queue: &WorkQueue,
    content: &str,
    options: &BatchOptions,
) -> Result<Summary, PipelineError> {
    if !options.needs_split(content) {
        let text = SUMMARIZER.invoke_text(model, content).await?;
        return Ok(Summary { text, batches: 1 });
    }

    let batches = split_content_into_batches(content, options)?;
    let total = batches.len();
    tracing::info!(batches = total, "content split for summarization");

    let partials = queue
        .try_map(batches, |batch| async move {
            let input = format!("Part {} of {total}:\n\n{}", batch.index + 1, batch.content);
            SUMMARIZER.invoke_text(model, input).await
        })
        .await?;

    let mut input = String::new();
    for (i, partial) in partials.iter().enumerate() {
        let _ = write!(input, "Part {}:\n{}\n\n", i + 1, partial);
    }
    let text = AGGREGATOR.invoke_text(model, input.trim_end()).await?;
    Ok(Summary {
        text,
        batches: total,
    })
}

/// Shared context for every generation call in a run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GenerationContext<'a> {
    pub title: Option<&'a str>,
    pub summary: &'a str,
    pub insights: &'a TrendInsights,
}

fn platform_brief(platform: Platform, rules: &PlatformRules) -> String {
    let mut brief = format!(
        "Platform: {}\nLimits: at most {} characters and {} hashtags.\n",
        platform.display_name(),
        rules.max_chars,
        rules.max_hashtags
    );
    if !rules.style_notes.is_empty() {
        let _ = writeln!(brief, "Platform notes: {}", rules.style_notes);
    }
    brief
}

/// Draft one variant; an unparseable reply yields [`placeholder_post`].
pub(crate) async fn generate_variant<M: LanguageModel>(
    model: &M,
    ctx: GenerationContext<'_>,
    platform: Platform,
    rules: &PlatformRules,
    style: PostStyle,
) -> Result<String, LlmError> {
    let mut input = platform_brief(platform, rules);
    let _ = writeln!(input, "Style: {style}. {}", style.guidance());
    if let Some(title) = ctx.title {
        let _ = writeln!(input, "Source title: {title}");
    }
    if !ctx.insights.angles.is_empty() {
        let _ = writeln!(input, "Trending angles: {}", ctx.insights.angles.join("; "));
    }
    if !ctx.insights.hashtags.is_empty() {
        let _ = writeln!(input, "Suggested hashtags: {}", ctx.insights.hashtags.join(" "));
    }
    if !ctx.insights.audience.is_empty() {
        let _ = writeln!(input, "Audience: {}", ctx.insights.audience);
    }
    let _ = write!(input, "\nSummary:\n{}", ctx.summary);

    let reply = WRITER.invoke_json::<M, ContentReply>(model, input).await?;
    Ok(ContentReply::non_empty(reply).unwrap_or_else(|| {
        tracing::warn!(platform = %platform, style = %style, "generation fell back to placeholder");
        placeholder_post(platform, style)
    }))
}

/// Score a post. Heuristic mode never calls the model; a malformed model
/// reply falls back to the heuristic.
pub(crate) async fn score_post<M: LanguageModel>(
    model: &M,
    mode: ScoringMode,
    weights: &ScoringWeights,
    platform: Platform,
    rules: &PlatformRules,
    content: &str,
) -> Result<ViralityScore, LlmError> {
    let heuristic = || heuristic_virality(&extract_post_metadata(content));
    if mode == ScoringMode::Heuristic {
        return Ok(heuristic());
    }

    let input = format!("{}\nPost:\n{content}", platform_brief(platform, rules));
    let reply = SCORER
        .invoke_json::<M, ModelScoreReply>(model, input)
        .await?;
    Ok(reply.map_or_else(heuristic, |r| r.into_virality(weights)))
}

/// Ask for a rewrite addressing the score's feedback. `None` when the reply is unusable.
pub(crate) async fn optimize_post<M: LanguageModel>(
    model: &M,
    platform: Platform,
    rules: &PlatformRules,
    content: &str,
    score: &ViralityScore,
) -> Result<Option<String>, LlmError> {
    let mut input = platform_brief(platform, rules);
    let _ = writeln!(input, "Current score: {}/100", score.virality_score);
    if let Some(criteria) = &score.criteria {
        let low = criteria.below(LOW_CRITERION);
        if !low.is_empty() {
            let _ = writeln!(input, "Weak criteria: {}", low.join(", "));
        }
    }
    for weakness in &score.weaknesses {
        let _ = writeln!(input, "Weakness: {weakness}");
    }
    for rec in &score.recommendations {
        let _ = writeln!(input, "Recommendation: {rec}");
    }
    let _ = write!(input, "\nPost:\n{content}");

    let reply = OPTIMIZER.invoke_json::<M, ContentReply>(model, input).await?;
    Ok(ContentReply::non_empty(reply))
}

/// Model-assisted formatting followed by the enforced compliance pass.
pub(crate) async fn format_post<M: LanguageModel>(
    model: &M,
    platform: Platform,
    rules: &PlatformRules,
    content: &str,
) -> Result<String, LlmError> {
    let input = format!("{}\nPost:\n{content}", platform_brief(platform, rules));
    let reply = FORMATTER.invoke_json::<M, ContentReply>(model, input).await?;
    let formatted = ContentReply::non_empty(reply).unwrap_or_else(|| content.to_string());
    Ok(enforce_rules(&formatted, rules))
}
