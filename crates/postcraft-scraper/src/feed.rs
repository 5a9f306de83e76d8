//! RSS/Atom feed flattening.

use crate::error::ScraperError;
use crate::html::extract_readable_text;
use crate::types::ScrapeMetadata;

/// Entries beyond this are ignored; feeds are newest-first.
const MAX_FEED_ENTRIES: usize = 20;

/// Parse a feed body into one text block (one section per entry) plus metadata.
///
/// # Errors
///
/// Returns [`ScraperError::Feed`] if the body is not a recognisable feed, or
/// [`ScraperError::EmptyContent`] if it has no entries with text.
pub fn parse_feed(body: &[u8], url: &str) -> Result<(String, ScrapeMetadata), ScraperError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| ScraperError::Feed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let mut sections = Vec::new();
    for entry in feed.entries.iter().take(MAX_FEED_ENTRIES) {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();
        let body_html = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
            .unwrap_or_default();
        let body = extract_readable_text(&body_html).replace('\n', " ");
        let link = entry.links.first().map(|l| l.href.clone());

        if title.is_empty() && body.is_empty() {
            continue;
        }

        let mut section = String::new();
        if !title.is_empty() {
            section.push_str("## ");
            section.push_str(&title);
            section.push('\n');
        }
        if !body.is_empty() {
            section.push_str(&body);
            section.push('\n');
        }
        if let Some(link) = link {
            section.push_str(&link);
            section.push('\n');
        }
        sections.push(section.trim_end().to_string());
    }

    if sections.is_empty() {
        return Err(ScraperError::EmptyContent {
            url: url.to_string(),
        });
    }

    let metadata = ScrapeMetadata {
        title: feed.title.map(|t| t.content.trim().to_string()),
        author: feed.authors.first().map(|p| p.name.clone()),
        item_count: Some(sections.len()),
        ..ScrapeMetadata::default()
    };

    Ok((sections.join("\n\n"), metadata))
}
