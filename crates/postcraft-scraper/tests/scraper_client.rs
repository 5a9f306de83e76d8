//! Integration tests for `ScraperClient::scrape` against wiremock servers.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postcraft_scraper::{ScraperClient, ScraperError, SourceKind};

/// 5-second timeout, no retries.
fn test_client() -> ScraperClient {
    ScraperClient::new(5, "postcraft-test/0.1", 0, 0).expect("failed to build test client")
}

fn test_client_with_retries(max_retries: u32) -> ScraperClient {
    ScraperClient::new(5, "postcraft-test/0.1", max_retries, 1).expect("failed to build test client")
}

const ARTICLE: &str = r#"<html><head><title>Launch Notes</title><meta name="author" content="Grace Hopper"></head>
<body><nav>Menu</nav><article><h1>Launch Notes</h1><p>We shipped the new compiler today.</p><p>Builds are twice as fast.</p></article></body></html>"#;

#[tokio::test]
async fn scrape_web_page_extracts_article_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blog/launch"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(ARTICLE),
        )
        .mount(&server)
        .await;

    let url = format!("{}/blog/launch", server.uri());
    let scraped = test_client().scrape(&url).await.expect("scrape should succeed");

    assert!(scraped.success);
    assert_eq!(scraped.kind, SourceKind::Web);
    assert_eq!(scraped.source, url);
    assert_eq!(
        scraped.content,
        "Launch Notes\nWe shipped the new compiler today.\nBuilds are twice as fast."
    );
    assert_eq!(scraped.metadata.title.as_deref(), Some("Launch Notes"));
    assert_eq!(scraped.metadata.author.as_deref(), Some("Grace Hopper"));
    assert_eq!(scraped.metadata.word_count, 13);
}

#[tokio::test]
async fn scrape_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let err = test_client_with_retries(3).scrape(&url).await.unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn scrape_500_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = format!("{}/boom", server.uri());
    let err = test_client().scrape(&url).await.unwrap_err();
    assert!(matches!(
        err,
        ScraperError::UnexpectedStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn scrape_retries_429_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
        .mount(&server)
        .await;

    let url = format!("{}/blog/launch", server.uri());
    let scraped = test_client_with_retries(2).scrape(&url).await.expect("should recover");
    assert_eq!(scraped.kind, SourceKind::Web);
}

#[tokio::test]
async fn scrape_empty_page_is_empty_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><script>x()</script></body></html>"))
        .mount(&server)
        .await;

    let err = test_client()
        .scrape(&format!("{}/blank", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::EmptyContent { .. }));
}

#[tokio::test]
async fn scrape_feed_url_parses_rss() {
    let server = MockServer::start().await;

    let rss = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Dev Log</title>
<item><title>Post one</title><link>https://example.com/1</link><description>First body text.</description></item>
</channel></rss>"#;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(rss),
        )
        .mount(&server)
        .await;

    let scraped = test_client()
        .scrape(&format!("{}/feed", server.uri()))
        .await
        .expect("feed should parse");
    assert_eq!(scraped.kind, SourceKind::Rss);
    assert_eq!(scraped.metadata.title.as_deref(), Some("Dev Log"));
    assert_eq!(scraped.metadata.item_count, Some(1));
    assert!(scraped.content.contains("Post one"));
}

#[tokio::test]
async fn scrape_youtube_fetches_transcript() {
    let server = MockServer::start().await;

    let watch_page = format!(
        r#"<html><script>var ytInitialPlayerResponse = {{"videoDetails":{{"videoId":"abc123","title":"Ownership Explained","author":"Rustacean"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{}/api/timedtext?v=abc123&lang=en","languageCode":"en"}}]}}}}}};</script></html>"#,
        server.uri()
    );
    let timed_text = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="4.5">Every value has an owner.</text><text start="4.5" dur="5">When the owner goes out of scope the value is dropped.</text></transcript>"#;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(watch_page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(timed_text))
        .mount(&server)
        .await;

    let client = test_client().with_youtube_base(&server.uri());
    let scraped = client
        .scrape("https://www.youtube.com/watch?v=abc123")
        .await
        .expect("transcript should be scraped");

    assert_eq!(scraped.kind, SourceKind::Youtube);
    assert_eq!(
        scraped.content,
        "Every value has an owner. When the owner goes out of scope the value is dropped."
    );
    assert_eq!(scraped.metadata.title.as_deref(), Some("Ownership Explained"));
    assert_eq!(scraped.metadata.author.as_deref(), Some("Rustacean"));
    assert_eq!(scraped.metadata.duration_secs, Some(10));
}

#[tokio::test]
async fn scrape_youtube_without_captions_is_no_transcript() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no captions here</html>"))
        .mount(&server)
        .await;

    let client = test_client().with_youtube_base(&server.uri());
    let err = client.scrape("https://youtu.be/abc123").await.unwrap_err();
    assert!(
        matches!(err, ScraperError::NoTranscript { ref video_id } if video_id == "abc123"),
        "got {err:?}"
    );
}
