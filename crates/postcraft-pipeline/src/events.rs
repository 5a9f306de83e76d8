//! Progress events streamed to clients while a pipeline runs.

use postcraft_core::{Platform, PostStyle};
use postcraft_scraper::SourceKind;
use serde::{Deserialize, Serialize};

use crate::metadata::PostMetadata;
use crate::scoring::ViralityScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scraping,
    Analyzing,
    Summarizing,
    Generating,
    Scoring,
    Optimizing,
    Formatting,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Scraping => "scraping",
            Stage::Analyzing => "analyzing",
            Stage::Summarizing => "summarizing",
            Stage::Generating => "generating",
            Stage::Scoring => "scoring",
            Stage::Optimizing => "optimizing",
            Stage::Formatting => "formatting",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Completed,
}

/// Output of the trend-analysis stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendInsights {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub angles: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub audience: String,
}

/// Per-platform length and hashtag check on the final text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compliance {
    pub char_count: usize,
    pub max_chars: usize,
    pub within_limit: bool,
    pub hashtag_count: usize,
    pub max_hashtags: usize,
    pub hashtags_ok: bool,
}

/// The surviving variant for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub platform: Platform,
    pub style: PostStyle,
    pub content: String,
    pub score: ViralityScore,
    pub formatted_content: String,
    pub compliance: Compliance,
    pub metadata: PostMetadata,
    pub optimized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub word_count: usize,
}

/// Payload of the terminal `complete` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub source: SourceSummary,
    pub summary: String,
    pub insights: TrendInsights,
    pub posts: Vec<GeneratedPost>,
}

/// One frame of the pipeline stream. Serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Step {
        step: Stage,
        status: StepStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    SearchResults {
        insights: TrendInsights,
    },
    Score {
        platform: Platform,
        style: PostStyle,
        score: ViralityScore,
    },
    Optimization {
        platform: Platform,
        before: u8,
        after: u8,
        applied: bool,
    },
    /// The result's fields sit next to `type` on the wire.
    Complete(PipelineResult),
    Error {
        stage: Stage,
        error: String,
    },
}

impl PipelineEvent {
    pub(crate) fn started(step: Stage) -> Self {
        PipelineEvent::Step {
            step,
            status: StepStatus::Started,
            message: None,
        }
    }

    pub(crate) fn completed(step: Stage, message: impl Into<String>) -> Self {
        PipelineEvent::Step {
            step,
            status: StepStatus::Completed,
            message: Some(message.into()),
        }
    }

    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineEvent::Complete(_) | PipelineEvent::Error { .. }
        )
    }
}
