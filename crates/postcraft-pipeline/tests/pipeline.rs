use std::sync::Mutex;

use futures::StreamExt;
use postcraft_core::{Platform, PostStyle, ScoringMode};
use postcraft_llm::{LanguageModel, LlmError, Prompt};
use postcraft_pipeline::prompts::{
    AGGREGATOR_PROMPT, FORMATTER_PROMPT, OPTIMIZER_PROMPT, SCORER_PROMPT, SUMMARIZER_PROMPT,
    TREND_ANALYST_PROMPT, WRITER_PROMPT,
};
use postcraft_pipeline::{
    BatchOptions, Pipeline, PipelineConfig, PipelineEvent, ScoreSource, Stage, StepStatus,
};
use postcraft_scraper::ScraperClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Responder = Box<dyn Fn(&Prompt) -> Result<String, LlmError> + Send + Sync>;

/// Answers by agent (system prompt) and records every prompt it receives.
struct ScriptedModel {
    calls: Mutex<Vec<Prompt>>,
    respond: Responder,
}

impl ScriptedModel {
    fn new(respond: impl Fn(&Prompt) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    fn calls_to(&self, system: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.system.as_deref() == Some(system))
            .count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(prompt.clone());
        (self.respond)(prompt)
    }
}

fn system(prompt: &Prompt) -> &str {
    prompt.system.as_deref().unwrap_or_default()
}

/// A well-behaved model: every agent answers in the expected shape.
fn happy_reply(prompt: &Prompt, score: u8) -> Result<String, LlmError> {
    let sys = system(prompt);
    let reply = if sys == TREND_ANALYST_PROMPT {
        r##"Here you go: {"topics":["rust","async"],"angles":["speed"],"hashtags":["#rust"],"audience":"developers"}"##.to_string()
    } else if sys == SUMMARIZER_PROMPT || sys == AGGREGATOR_PROMPT {
        "Rust 2.0 ships with faster builds.".to_string()
    } else if sys == WRITER_PROMPT {
        r#"```json
{"content": "Rust just got a lot faster and here is why it matters. What do you think?"}
```"#
            .to_string()
    } else if sys == SCORER_PROMPT {
        format!(
            r#"{{"scores":{{"hook":{score},"clarity":{score},"emotion":{score},"novelty":{score},"compliance":{score}}},"strengths":["clear"]}}"#
        )
    } else if sys == FORMATTER_PROMPT {
        r#"{"content": "Rust just got a lot faster.\n\nWhat do you think? #rust #async #tokio"}"#
            .to_string()
    } else {
        r#"{"content": "unused"}"#.to_string()
    };
    Ok(reply)
}

const ARTICLE: &str = "<html><head><title>Launch Notes</title></head><body>\
    <nav>Home</nav><article><h1>Launch Notes</h1>\
    <p>Rust 2.0 ships today with much faster incremental builds.</p></article></body></html>";

async fn serve_article(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn scraper() -> ScraperClient {
    ScraperClient::new(5, "postcraft-test/0.1", 0, 0).expect("scraper client")
}

fn config() -> PipelineConfig {
    PipelineConfig {
        styles: vec![PostStyle::Viral, PostStyle::Punchy],
        default_platforms: vec![Platform::Twitter, Platform::Linkedin],
        ..PipelineConfig::default()
    }
}

async fn collect(
    pipeline: &Pipeline<ScriptedModel>,
    url: String,
    platforms: Vec<Platform>,
) -> Vec<PipelineEvent> {
    pipeline.process_url(url, platforms).collect().await
}

#[tokio::test]
async fn missing_page_yields_single_scraping_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(ScriptedModel::new(|p| happy_reply(p, 9)), scraper(), config());
    let events = collect(&pipeline, format!("{}/gone", server.uri()), vec![]).await;

    let errors: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        PipelineEvent::Error { stage: Stage::Scraping, .. }
    ));
    assert!(!events.iter().any(|e| matches!(e, PipelineEvent::Complete(_))));
    assert!(events.last().unwrap().is_terminal());
    assert_eq!(pipeline.model().total_calls(), 0);
}

#[tokio::test]
async fn happy_path_emits_scores_and_completes() {
    let server = MockServer::start().await;
    serve_article(&server, ARTICLE).await;

    let pipeline = Pipeline::new(ScriptedModel::new(|p| happy_reply(p, 9)), scraper(), config());
    let events = collect(&pipeline, format!("{}/post", server.uri()), vec![]).await;

    let first_step = &events[0];
    assert!(matches!(
        first_step,
        PipelineEvent::Step { step: Stage::Scraping, status: StepStatus::Started, .. }
    ));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::SearchResults { .. }))
            .count(),
        1
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Score { .. }))
            .count(),
        4
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, PipelineEvent::Optimization { .. })));

    let Some(PipelineEvent::Complete(result)) = events.last() else {
        panic!("expected complete, got {:?}", events.last());
    };
    assert_eq!(result.source.title.as_deref(), Some("Launch Notes"));
    assert_eq!(result.insights.topics, vec!["rust", "async"]);
    assert_eq!(result.posts.len(), 2);
    assert_eq!(result.posts[0].platform, Platform::Twitter);
    assert_eq!(result.posts[1].platform, Platform::Linkedin);

    let twitter = &result.posts[0];
    assert_eq!(twitter.score.virality_score, 90);
    assert_eq!(twitter.style, PostStyle::Viral);
    assert!(!twitter.optimized);
    // Twitter allows two hashtags; the formatter's third is dropped.
    assert_eq!(twitter.metadata.hashtags, vec!["#rust", "#async"]);
    assert!(twitter.compliance.within_limit);
    assert!(twitter.compliance.hashtags_ok);

    let linkedin = &result.posts[1];
    assert_eq!(linkedin.metadata.hashtags.len(), 3);

    // trend + summary + 4 drafts + 4 scores + 2 formats
    assert_eq!(pipeline.model().total_calls(), 12);
}

#[tokio::test]
async fn low_scores_are_optimized_when_rewrite_scores_higher() {
    let server = MockServer::start().await;
    serve_article(&server, ARTICLE).await;

    let model = ScriptedModel::new(|p| {
        let sys = system(p);
        if sys == OPTIMIZER_PROMPT {
            return Ok(r#"{"content": "IMPROVED: Rust builds are now twice as fast. Try it today."}"#.to_string());
        }
        if sys == SCORER_PROMPT {
            let s = if p.user.contains("IMPROVED") { 9 } else { 4 };
            return happy_reply(p, s);
        }
        happy_reply(p, 0)
    });
    let pipeline = Pipeline::new(model, scraper(), config());
    let events = collect(&pipeline, format!("{}/post", server.uri()), vec![Platform::Twitter]).await;

    let optimizations: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Optimization { platform, before, after, applied } => {
                Some((*platform, *before, *after, *applied))
            }
            _ => None,
        })
        .collect();
    assert_eq!(optimizations, vec![(Platform::Twitter, 40, 90, true)]);

    let Some(PipelineEvent::Complete(result)) = events.last() else {
        panic!("expected complete");
    };
    assert!(result.posts[0].optimized);
    assert!(result.posts[0].content.starts_with("IMPROVED"));
    assert_eq!(result.posts[0].score.virality_score, 90);
}

#[tokio::test]
async fn worse_rewrite_is_discarded() {
    let server = MockServer::start().await;
    serve_article(&server, ARTICLE).await;

    let model = ScriptedModel::new(|p| {
        let sys = system(p);
        if sys == OPTIMIZER_PROMPT {
            return Ok(r#"{"content": "WORSE"}"#.to_string());
        }
        if sys == SCORER_PROMPT {
            let s = if p.user.contains("WORSE") { 2 } else { 5 };
            return happy_reply(p, s);
        }
        happy_reply(p, 0)
    });
    let pipeline = Pipeline::new(model, scraper(), config());
    let events = collect(&pipeline, format!("{}/post", server.uri()), vec![Platform::Linkedin]).await;

    assert!(events.iter().any(|e| matches!(
        e,
        PipelineEvent::Optimization { before: 50, after: 20, applied: false, .. }
    )));
    let Some(PipelineEvent::Complete(result)) = events.last() else {
        panic!("expected complete");
    };
    assert!(!result.posts[0].optimized);
    assert_eq!(result.posts[0].score.virality_score, 50);
}

#[tokio::test]
async fn malformed_drafts_become_placeholders() {
    let server = MockServer::start().await;
    serve_article(&server, ARTICLE).await;

    let model = ScriptedModel::new(|p| {
        if system(p) == WRITER_PROMPT || system(p) == FORMATTER_PROMPT {
            return Ok("Sorry, I can't produce JSON today.".to_string());
        }
        happy_reply(p, 9)
    });
    let cfg = PipelineConfig {
        scoring_mode: ScoringMode::Heuristic,
        optimize_threshold: 0,
        ..config()
    };
    let pipeline = Pipeline::new(model, scraper(), cfg);
    let events = collect(&pipeline, format!("{}/post", server.uri()), vec![Platform::Threads]).await;

    let Some(PipelineEvent::Complete(result)) = events.last() else {
        panic!("expected complete, got {:?}", events.last());
    };
    assert_eq!(result.posts[0].content, "[Draft unavailable for threads (viral)]");
    assert_eq!(result.posts[0].formatted_content, "[Draft unavailable for threads (viral)]");
    assert_eq!(pipeline.model().calls_to(SCORER_PROMPT), 0);
}

#[tokio::test]
async fn rate_limit_during_analysis_ends_run() {
    let server = MockServer::start().await;
    serve_article(&server, ARTICLE).await;

    let model = ScriptedModel::new(|p| {
        if system(p) == TREND_ANALYST_PROMPT {
            return Err(LlmError::RateLimited);
        }
        happy_reply(p, 9)
    });
    let pipeline = Pipeline::new(model, scraper(), config());
    let events = collect(&pipeline, format!("{}/post", server.uri()), vec![]).await;

    assert!(matches!(
        events.last(),
        Some(PipelineEvent::Error { stage: Stage::Analyzing, .. })
    ));
    assert_eq!(pipeline.model().calls_to(SUMMARIZER_PROMPT), 0);
}

#[tokio::test]
async fn empty_agent_replies_fall_back_instead_of_failing() {
    let server = MockServer::start().await;
    serve_article(&server, ARTICLE).await;

    let model = ScriptedModel::new(|p| {
        let sys = system(p);
        if sys == TREND_ANALYST_PROMPT || sys == SCORER_PROMPT {
            return Err(LlmError::EmptyResponse);
        }
        happy_reply(p, 9)
    });
    let pipeline = Pipeline::new(model, scraper(), config());
    let events = collect(&pipeline, format!("{}/post", server.uri()), vec![Platform::Linkedin]).await;

    assert!(!events.iter().any(|e| matches!(e, PipelineEvent::Error { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        PipelineEvent::SearchResults { insights } if insights.topics.is_empty()
    )));
    let Some(PipelineEvent::Complete(result)) = events.last() else {
        panic!("expected complete, got {:?}", events.last());
    };
    assert_eq!(result.posts[0].score.source, ScoreSource::Heuristic);
}

#[tokio::test]
async fn long_content_is_summarized_in_batches() {
    let server = MockServer::start().await;
    let paragraph = "Incremental compilation now reuses far more work between builds. ".repeat(12);
    let body = format!("<html><body><article><p>{paragraph}</p></article></body></html>");
    serve_article(&server, &body).await;

    let cfg = PipelineConfig {
        batch: BatchOptions {
            chunk_size: 300,
            overlap: 50,
            max_batches: 10,
        },
        styles: vec![PostStyle::Professional],
        ..config()
    };
    let pipeline = Pipeline::new(ScriptedModel::new(|p| happy_reply(p, 9)), scraper(), cfg);
    let result = pipeline
        .run(format!("{}/post", server.uri()), vec![Platform::Linkedin])
        .await
        .expect("pipeline completes");

    let chars = paragraph.trim().chars().count();
    let expected_batches = chars.div_ceil(250);
    assert!(expected_batches > 1);
    assert_eq!(pipeline.model().calls_to(SUMMARIZER_PROMPT), expected_batches);
    assert_eq!(pipeline.model().calls_to(AGGREGATOR_PROMPT), 1);
    assert_eq!(result.summary, "Rust 2.0 ships with faster builds.");
}

#[tokio::test]
async fn run_reports_failing_stage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/boom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(ScriptedModel::new(|p| happy_reply(p, 9)), scraper(), config());
    let err = pipeline
        .run(format!("{}/boom", server.uri()), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.stage, Stage::Scraping);
    assert!(err.to_string().starts_with("scraping failed"));
}
