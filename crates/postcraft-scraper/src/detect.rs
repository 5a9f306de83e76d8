//! URL-shape routing for the scrape stage.

use reqwest::Url;

use crate::types::SourceKind;

/// Pick the scraper for `url` from its host and path alone.
///
/// Unparseable URLs are reported as [`SourceKind::Web`]; the web fetch then
/// fails with a proper error.
#[must_use]
pub fn detect_source_kind(url: &str) -> SourceKind {
    if youtube_video_id(url).is_some() {
        return SourceKind::Youtube;
    }

    let Ok(parsed) = Url::parse(url) else {
        return SourceKind::Web;
    };

    let path = parsed.path().to_lowercase();
    let looks_like_feed = [".xml", ".rss", ".atom"]
        .iter()
        .any(|ext| path.ends_with(ext))
        || path
            .split('/')
            .any(|seg| matches!(seg, "feed" | "rss" | "atom" | "feeds"))
        || parsed
            .query_pairs()
            .any(|(k, v)| k == "format" && (v == "rss" || v == "atom"));

    if looks_like_feed {
        SourceKind::Rss
    } else {
        SourceKind::Web
    }
}

/// Extract the video id from `youtube.com/watch?v=`, `youtu.be/`, `/shorts/` and `/embed/` links.
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let id = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("shorts" | "embed" | "live") => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_and_short_links() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            youtube_video_id("https://youtube.com/shorts/abc_DEF-123"),
            Some("abc_DEF-123".to_string())
        );
        assert_eq!(youtube_video_id("https://www.youtube.com/channel/xyz"), None);
        assert_eq!(youtube_video_id("https://example.com/watch?v=abc"), None);
    }

    #[test]
    fn detects_youtube() {
        assert_eq!(
            detect_source_kind("https://m.youtube.com/watch?v=abc123"),
            SourceKind::Youtube
        );
    }

    #[test]
    fn detects_feeds() {
        assert_eq!(detect_source_kind("https://blog.example.com/feed"), SourceKind::Rss);
        assert_eq!(detect_source_kind("https://example.com/index.xml"), SourceKind::Rss);
        assert_eq!(detect_source_kind("https://example.com/news.rss"), SourceKind::Rss);
        assert_eq!(
            detect_source_kind("https://example.com/posts?format=atom"),
            SourceKind::Rss
        );
    }

    #[test]
    fn everything_else_is_web() {
        assert_eq!(
            detect_source_kind("https://example.com/blog/feeding-cats"),
            SourceKind::Web
        );
        assert_eq!(detect_source_kind("not a url"), SourceKind::Web);
    }
}
