//! Turns one URL into scored, platform-compliant social posts.
//!
//! [`Pipeline::process_url`] yields [`PipelineEvent`]s while it scrapes,
//! analyzes, summarizes, generates, scores, optimizes and formats. The pure
//! building blocks ([`split_content_into_batches`], [`extract_post_metadata`],
//! [`heuristic_score`]) are usable on their own.

pub mod agents;
pub mod batch;
pub mod edit;
pub mod error;
pub mod events;
pub mod format;
pub mod metadata;
pub mod pipeline;
pub mod prompts;
pub mod queue;
pub mod scoring;
pub mod stages;

pub use batch::{split_content_into_batches, Batch, BatchError, BatchOptions};
pub use edit::{edit_post, EditOutcome};
pub use error::PipelineError;
pub use events::{
    Compliance, GeneratedPost, PipelineEvent, PipelineResult, SourceSummary, Stage, StepStatus,
    TrendInsights,
};
pub use format::{check_compliance, enforce_rules};
pub use metadata::{extract_post_metadata, PostFormat, PostMetadata};
pub use pipeline::{Pipeline, PipelineConfig, StageFailure};
pub use queue::WorkQueue;
pub use scoring::{
    heuristic_score, heuristic_virality, CriteriaScores, ScoreSource, ScoringWeights,
    ViralityScore,
};
pub use stages::placeholder_post;
