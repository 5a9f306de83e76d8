//! `postcraft run`: drive the pipeline from the terminal.

use futures::StreamExt;
use postcraft_core::{load_platform_rules, AppConfig, Platform, RuleSet};
use postcraft_llm::{LlmClient, RetryPolicy};
use postcraft_pipeline::{Pipeline, PipelineConfig, PipelineEvent, StepStatus};
use postcraft_scraper::ScraperClient;

pub(crate) async fn run_pipeline(
    config: &AppConfig,
    url: String,
    platforms: Vec<Platform>,
    json: bool,
) -> anyhow::Result<()> {
    let rules = match &config.platforms_path {
        Some(path) => load_platform_rules(path)?,
        None => RuleSet::default(),
    };
    let llm = LlmClient::new(
        &config.llm_api_key,
        &config.llm_base_url,
        &config.llm_model,
        config.llm_timeout_secs,
        RetryPolicy {
            max_retries: config.llm_max_retries,
            base_delay_ms: config.llm_retry_base_ms,
            jitter: true,
        },
    )?;
    let scraper = ScraperClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_base_ms,
    )?;
    let pipeline = Pipeline::new(llm, scraper, PipelineConfig::from_app_config(config, rules));

    let events = pipeline.process_url(url, platforms);
    futures::pin_mut!(events);

    let mut failed = None;
    while let Some(event) = events.next().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            print_event(&event);
        }
        if let PipelineEvent::Error { stage, error } = event {
            failed = Some(format!("{stage} failed: {error}"));
        }
    }

    match failed {
        Some(message) => anyhow::bail!(message),
        None => Ok(()),
    }
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Step {
            step,
            status: StepStatus::Started,
            ..
        } => println!("==> {step}"),
        PipelineEvent::Step {
            status: StepStatus::Completed,
            message,
            ..
        } => {
            if let Some(message) = message {
                println!("    {message}");
            }
        }
        PipelineEvent::SearchResults { insights } => {
            if !insights.topics.is_empty() {
                println!("    topics: {}", insights.topics.join(", "));
            }
            if !insights.hashtags.is_empty() {
                println!("    hashtags: {}", insights.hashtags.join(" "));
            }
        }
        PipelineEvent::Score {
            platform,
            style,
            score,
        } => println!(
            "    {platform}/{style}: {} ({})",
            score.virality_score, score.predicted_engagement
        ),
        PipelineEvent::Optimization {
            platform,
            before,
            after,
            applied,
        } => println!(
            "    {platform}: {before} -> {after}{}",
            if *applied { "" } else { " (kept original)" }
        ),
        PipelineEvent::Complete(result) => {
            println!();
            println!("Summary:\n{}\n", result.summary);
            for post in &result.posts {
                println!(
                    "--- {} ({}, score {}{}) ---",
                    post.platform.display_name(),
                    post.style,
                    post.score.virality_score,
                    if post.optimized { ", optimized" } else { "" }
                );
                println!("{}", post.formatted_content);
                println!(
                    "[{}/{} chars, {}/{} hashtags]\n",
                    post.compliance.char_count,
                    post.compliance.max_chars,
                    post.compliance.hashtag_count,
                    post.compliance.max_hashtags
                );
            }
        }
        PipelineEvent::Error { stage, error } => eprintln!("error during {stage}: {error}"),
    }
}
