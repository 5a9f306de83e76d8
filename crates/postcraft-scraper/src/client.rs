//! HTTP client that runs the scrape stage for one URL.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode, Url};

use crate::detect::{detect_source_kind, youtube_video_id};
use crate::error::ScraperError;
use crate::feed::parse_feed;
use crate::html::{extract_author, extract_readable_text, extract_title};
use crate::rate_limit::retry_with_backoff;
use crate::types::{ScrapeMetadata, ScrapedContent, SourceKind};
use crate::youtube::{extract_video_author, extract_video_title, find_caption_track_url, parse_timed_text};

const DEFAULT_YOUTUBE_BASE: &str = "https://www.youtube.com";

/// A fetched response body and its declared content type.
struct Fetched {
    content_type: String,
    body: Vec<u8>,
}

/// Scrapes web pages, `YouTube` transcripts and RSS/Atom feeds.
///
/// Non-2xx responses are typed errors; 429 is retried with exponential
/// backoff up to `max_retries` additional attempts.
pub struct ScraperClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
    youtube_base: String,
}

impl ScraperClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
            youtube_base: DEFAULT_YOUTUBE_BASE.to_string(),
        })
    }

    /// Point `YouTube` watch-page fetches at another host (wiremock in tests).
    #[must_use]
    pub fn with_youtube_base(mut self, base: &str) -> Self {
        self.youtube_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Scrape `url`, routing on its shape.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    /// - [`ScraperError::NotFound`] / [`ScraperError::UnexpectedStatus`] for non-2xx.
    /// - [`ScraperError::RateLimited`] after retries are exhausted.
    /// - [`ScraperError::NoTranscript`] for videos without captions.
    /// - [`ScraperError::Feed`] / [`ScraperError::EmptyContent`] when nothing readable is found.
    pub async fn scrape(&self, url: &str) -> Result<ScrapedContent, ScraperError> {
        validate_url(url)?;
        let kind = detect_source_kind(url);
        tracing::info!(url, kind = %kind, "scraping source");

        let scraped = match kind {
            SourceKind::Youtube => self.scrape_youtube(url).await?,
            SourceKind::Rss => self.scrape_feed(url).await?,
            SourceKind::Web => self.scrape_web(url).await?,
        };

        tracing::info!(
            url,
            kind = %scraped.kind,
            chars = scraped.metadata.char_count,
            words = scraped.metadata.word_count,
            "scrape complete"
        );
        Ok(scraped)
    }

    async fn scrape_web(&self, url: &str) -> Result<ScrapedContent, ScraperError> {
        let fetched = self.fetch(url).await?;

        // Some feeds live at unremarkable URLs; trust the body over the path.
        if looks_like_feed(&fetched) {
            let (content, metadata) = parse_feed(&fetched.body, url)?;
            return Ok(ScrapedContent::new(SourceKind::Rss, url, content, metadata));
        }

        let html = String::from_utf8_lossy(&fetched.body);
        let content = extract_readable_text(&html);
        if content.trim().is_empty() {
            return Err(ScraperError::EmptyContent {
                url: url.to_string(),
            });
        }

        let metadata = ScrapeMetadata {
            title: extract_title(&html),
            author: extract_author(&html),
            ..ScrapeMetadata::default()
        };
        Ok(ScrapedContent::new(SourceKind::Web, url, content, metadata))
    }

    async fn scrape_feed(&self, url: &str) -> Result<ScrapedContent, ScraperError> {
        let fetched = self.fetch(url).await?;
        let (content, metadata) = parse_feed(&fetched.body, url)?;
        Ok(ScrapedContent::new(SourceKind::Rss, url, content, metadata))
    }

    async fn scrape_youtube(&self, url: &str) -> Result<ScrapedContent, ScraperError> {
        let video_id = youtube_video_id(url).ok_or_else(|| ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: "no YouTube video id".to_string(),
        })?;

        let watch_url = format!(
            "{}/watch?v={}",
            self.youtube_base,
            utf8_percent_encode(&video_id, NON_ALPHANUMERIC)
        );
        let page = self.fetch(&watch_url).await?;
        let page = String::from_utf8_lossy(&page.body);

        let track_url = find_caption_track_url(&page).ok_or_else(|| ScraperError::NoTranscript {
            video_id: video_id.clone(),
        })?;
        let timed_text = self.fetch(&track_url).await?;
        let transcript = parse_timed_text(&String::from_utf8_lossy(&timed_text.body))?;

        if transcript.text.trim().is_empty() {
            return Err(ScraperError::NoTranscript { video_id });
        }

        let metadata = ScrapeMetadata {
            title: extract_video_title(&page),
            author: extract_video_author(&page),
            duration_secs: Some(transcript.duration_secs),
            ..ScrapeMetadata::default()
        };
        Ok(ScrapedContent::new(
            SourceKind::Youtube,
            url,
            transcript.text,
            metadata,
        ))
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ScraperError::RateLimited {
                    url: url.to_string(),
                });
            }
            if status == StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: url.to_string(),
                });
            }
            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_lowercase();
            let body = response.bytes().await?.to_vec();
            Ok(Fetched { content_type, body })
        })
        .await
    }
}

fn validate_url(url: &str) -> Result<(), ScraperError> {
    let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(())
}

fn looks_like_feed(fetched: &Fetched) -> bool {
    let ct = &fetched.content_type;
    if ct.contains("rss") || ct.contains("atom") {
        return true;
    }
    if ct.contains("html") {
        return false;
    }
    let head = String::from_utf8_lossy(&fetched.body[..fetched.body.len().min(512)]).to_lowercase();
    head.contains("<rss") || head.contains("<feed")
}
