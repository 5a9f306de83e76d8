//! The URL-to-posts orchestrator.

use futures::stream::{Stream, StreamExt};
use postcraft_core::{AppConfig, Platform, PostStyle, RuleSet, ScoringMode};
use postcraft_llm::LanguageModel;
use postcraft_scraper::ScraperClient;
use thiserror::Error;

use crate::batch::BatchOptions;
use crate::error::PipelineError;
use crate::events::{GeneratedPost, PipelineEvent, PipelineResult, SourceSummary, Stage};
use crate::format::check_compliance;
use crate::metadata::extract_post_metadata;
use crate::queue::WorkQueue;
use crate::scoring::{ScoringWeights, ViralityScore};
use crate::stages::{self, GenerationContext};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch: BatchOptions,
    pub styles: Vec<PostStyle>,
    pub default_platforms: Vec<Platform>,
    /// Posts scoring below this (0–100) go through the optimizer.
    pub optimize_threshold: u8,
    pub scoring_mode: ScoringMode,
    pub weights: ScoringWeights,
    pub rules: RuleSet,
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch: BatchOptions::default(),
            styles: vec![PostStyle::Viral, PostStyle::Professional, PostStyle::Punchy],
            default_platforms: vec![Platform::Linkedin, Platform::Twitter],
            optimize_threshold: 70,
            scoring_mode: ScoringMode::Model,
            weights: ScoringWeights::default(),
            rules: RuleSet::default(),
            concurrency: 1,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, rules: RuleSet) -> Self {
        Self {
            batch: BatchOptions {
                chunk_size: config.batch_chunk_size,
                overlap: config.batch_overlap,
                max_batches: config.batch_max_batches,
            },
            styles: config.post_styles.clone(),
            default_platforms: config.default_platforms.clone(),
            optimize_threshold: config.optimize_threshold,
            scoring_mode: config.scoring_mode,
            weights: ScoringWeights::default(),
            rules,
            concurrency: 1,
        }
    }
}

/// A run that ended with an `error` event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    pub error: String,
}

/// A drafted variant awaiting selection.
struct Variant {
    platform: Platform,
    style: PostStyle,
    content: String,
    score: ViralityScore,
}

/// The surviving variant for a platform, before formatting.
struct Candidate {
    platform: Platform,
    style: PostStyle,
    content: String,
    score: ViralityScore,
    optimized: bool,
}

/// Pick the highest-scoring variant per platform, in `platforms` order.
/// Ties keep the earlier variant.
fn select_best(platforms: &[Platform], variants: Vec<Variant>) -> Vec<Candidate> {
    let mut best: Vec<Option<Variant>> = platforms.iter().map(|_| None).collect();
    for variant in variants {
        let Some(slot) = platforms.iter().position(|p| *p == variant.platform) else {
            continue;
        };
        let replace = best[slot]
            .as_ref()
            .is_none_or(|current| variant.score.virality_score > current.score.virality_score);
        if replace {
            best[slot] = Some(variant);
        }
    }
    best.into_iter()
        .flatten()
        .map(|v| Candidate {
            platform: v.platform,
            style: v.style,
            content: v.content,
            score: v.score,
            optimized: false,
        })
        .collect()
}

fn dedup_platforms(platforms: Vec<Platform>) -> Vec<Platform> {
    let mut out = Vec::with_capacity(platforms.len());
    for p in platforms {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

fn failure(stage: Stage, err: &PipelineError) -> PipelineEvent {
    tracing::error!(stage = %stage, error = %err, "pipeline stage failed");
    PipelineEvent::Error {
        stage,
        error: err.to_string(),
    }
}

pub struct Pipeline<M> {
    model: M,
    scraper: ScraperClient,
    config: PipelineConfig,
}

impl<M: LanguageModel> Pipeline<M> {
    pub fn new(model: M, scraper: ScraperClient, config: PipelineConfig) -> Self {
        Self {
            model,
            scraper,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run every stage for `url` and stream progress.
    ///
    /// The stream ends after exactly one terminal event: `complete` on
    /// success, `error { stage }` on the first unrecoverable failure. An empty
    /// `platforms` list means the configured defaults.
    pub fn process_url(
        &self,
        url: String,
        platforms: Vec<Platform>,
    ) -> impl Stream<Item = PipelineEvent> + Send + '_ {
        async_stream::stream! {
            let cfg = &self.config;
            let model = &self.model;
            let queue = WorkQueue::new(cfg.concurrency);
            let platforms = if platforms.is_empty() {
                cfg.default_platforms.clone()
            } else {
                dedup_platforms(platforms)
            };
            tracing::info!(url = %url, platforms = platforms.len(), styles = cfg.styles.len(), "pipeline started");

            // 1. scrape
            yield PipelineEvent::started(Stage::Scraping);
            let scraped = match self.scraper.scrape(&url).await {
                Ok(scraped) => scraped,
                Err(e) => {
                    yield failure(Stage::Scraping, &e.into());
                    return;
                }
            };
            yield PipelineEvent::completed(
                Stage::Scraping,
                format!("{} words from {} source", scraped.metadata.word_count, scraped.kind),
            );
            let title = scraped.metadata.title.as_deref();

            // 2. trends
            yield PipelineEvent::started(Stage::Analyzing);
            let insights = match stages::analyze_trends(model, title, &scraped.content, cfg.batch.chunk_size).await {
                Ok(insights) => insights,
                Err(e) => {
                    yield failure(Stage::Analyzing, &e.into());
                    return;
                }
            };
            yield PipelineEvent::SearchResults { insights: insights.clone() };
            yield PipelineEvent::completed(
                Stage::Analyzing,
                format!("{} topics identified", insights.topics.len()),
            );

            // 3. summarize
            yield PipelineEvent::started(Stage::Summarizing);
            let summary = match stages::summarize(model, &queue, &scraped.content, &cfg.batch).await {
                Ok(summary) => summary,
                Err(e) => {
                    yield failure(Stage::Summarizing, &e);
                    return;
                }
            };
            yield PipelineEvent::completed(
                Stage::Summarizing,
                format!("summarized from {} batch(es)", summary.batches),
            );

            // 4. generate
            yield PipelineEvent::started(Stage::Generating);
            let ctx = GenerationContext {
                title,
                summary: &summary.text,
                insights: &insights,
            };
            let jobs: Vec<(Platform, PostStyle)> = platforms
                .iter()
                .flat_map(|&p| cfg.styles.iter().map(move |&s| (p, s)))
                .collect();
            let drafts = match queue
                .try_map(jobs.iter().copied(), |(platform, style)| async move {
                    let rules = cfg.rules.get(platform);
                    stages::generate_variant(model, ctx, platform, &rules, style).await
                })
                .await
            {
                Ok(drafts) => drafts,
                Err(e) => {
                    yield failure(Stage::Generating, &e.into());
                    return;
                }
            };
            yield PipelineEvent::completed(Stage::Generating, format!("{} variants drafted", drafts.len()));

            // 5. score
            yield PipelineEvent::started(Stage::Scoring);
            let mut variants = Vec::with_capacity(drafts.len());
            for (&(platform, style), content) in jobs.iter().zip(drafts) {
                let rules = cfg.rules.get(platform);
                let score = match stages::score_post(model, cfg.scoring_mode, &cfg.weights, platform, &rules, &content).await {
                    Ok(score) => score,
                    Err(e) => {
                        yield failure(Stage::Scoring, &e.into());
                        return;
                    }
                };
                tracing::info!(platform = %platform, style = %style, score = score.virality_score, "variant scored");
                yield PipelineEvent::Score { platform, style, score: score.clone() };
                variants.push(Variant { platform, style, content, score });
            }
            let mut candidates = select_best(&platforms, variants);
            yield PipelineEvent::completed(Stage::Scoring, format!("{} platform winners selected", candidates.len()));

            // 6. optimize
            yield PipelineEvent::started(Stage::Optimizing);
            let mut optimized_count = 0usize;
            for candidate in &mut candidates {
                if candidate.score.virality_score >= cfg.optimize_threshold {
                    continue;
                }
                let rules = cfg.rules.get(candidate.platform);
                let before = candidate.score.virality_score;
                let rewrite = match stages::optimize_post(model, candidate.platform, &rules, &candidate.content, &candidate.score).await {
                    Ok(rewrite) => rewrite,
                    Err(e) => {
                        yield failure(Stage::Optimizing, &e.into());
                        return;
                    }
                };
                let Some(rewrite) = rewrite else {
                    yield PipelineEvent::Optimization { platform: candidate.platform, before, after: before, applied: false };
                    continue;
                };
                let rescored = match stages::score_post(model, cfg.scoring_mode, &cfg.weights, candidate.platform, &rules, &rewrite).await {
                    Ok(score) => score,
                    Err(e) => {
                        yield failure(Stage::Optimizing, &e.into());
                        return;
                    }
                };
                let after = rescored.virality_score;
                let applied = after > before;
                if applied {
                    candidate.content = rewrite;
                    candidate.score = rescored;
                    candidate.optimized = true;
                    optimized_count += 1;
                }
                tracing::info!(platform = %candidate.platform, before, after, applied, "optimization attempted");
                yield PipelineEvent::Optimization { platform: candidate.platform, before, after, applied };
            }
            yield PipelineEvent::completed(Stage::Optimizing, format!("{optimized_count} post(s) improved"));

            // 7. format
            yield PipelineEvent::started(Stage::Formatting);
            let formatted = match queue
                .try_map(
                    candidates.iter().map(|c| (c.platform, c.content.clone())).collect::<Vec<_>>(),
                    |(platform, content)| async move {
                        let rules = cfg.rules.get(platform);
                        stages::format_post(model, platform, &rules, &content).await
                    },
                )
                .await
            {
                Ok(formatted) => formatted,
                Err(e) => {
                    yield failure(Stage::Formatting, &e.into());
                    return;
                }
            };
            let posts: Vec<GeneratedPost> = candidates
                .into_iter()
                .zip(formatted)
                .map(|(c, formatted_content)| {
                    let rules = cfg.rules.get(c.platform);
                    GeneratedPost {
                        compliance: check_compliance(&formatted_content, &rules),
                        metadata: extract_post_metadata(&formatted_content),
                        platform: c.platform,
                        style: c.style,
                        content: c.content,
                        score: c.score,
                        formatted_content,
                        optimized: c.optimized,
                    }
                })
                .collect();
            yield PipelineEvent::completed(Stage::Formatting, format!("{} post(s) formatted", posts.len()));

            tracing::info!(url = %url, posts = posts.len(), "pipeline complete");
            yield PipelineEvent::Complete(PipelineResult {
                source: SourceSummary {
                    url: scraped.source.clone(),
                    kind: scraped.kind,
                    title: scraped.metadata.title.clone(),
                    word_count: scraped.metadata.word_count,
                },
                summary: summary.text,
                insights,
                posts,
            });
        }
    }

    /// Drive [`Pipeline::process_url`] to its terminal event.
    ///
    /// # Errors
    ///
    /// Returns [`StageFailure`] naming the stage that produced the `error` event.
    pub async fn run(&self, url: String, platforms: Vec<Platform>) -> Result<PipelineResult, StageFailure> {
        let events = self.process_url(url, platforms);
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            match event {
                PipelineEvent::Complete(result) => return Ok(result),
                PipelineEvent::Error { stage, error } => return Err(StageFailure { stage, error }),
                _ => {}
            }
        }
        Err(StageFailure {
            stage: Stage::Formatting,
            error: "pipeline ended without a terminal event".to_string(),
        })
    }
}
