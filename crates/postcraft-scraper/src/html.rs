//! HTML to readable-text reduction for generic web pages.

use std::sync::LazyLock;

use regex::Regex;

static NOISE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|svg|nav|footer|form|iframe)\b[^>]*>.*?</(script|style|noscript|svg|nav|footer|form|iframe)\s*>")
        .expect("valid noise regex")
});
static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static BLOCK_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|blockquote|section|article|pre)\s*>")
        .expect("valid block regex")
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid space regex"));

/// Lines shorter than this (after trimming) are treated as UI chrome and dropped.
const MIN_LINE_CHARS: usize = 3;

pub(crate) fn extract_title(html: &str) -> Option<String> {
    extract_meta_property(html, "og:title")
        .or_else(|| capture_first(html, r"(?is)<title[^>]*>(.*?)</title>"))
        .or_else(|| capture_first(html, r"(?is)<h1[^>]*>(.*?)</h1>"))
}

pub(crate) fn extract_author(html: &str) -> Option<String> {
    extract_meta_name(html, "author").or_else(|| extract_meta_property(html, "article:author"))
}

fn extract_meta_name(html: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<meta[^>]+name\s*=\s*["']{}["'][^>]*content\s*=\s*["']([^"']*)["']"#,
        regex::escape(name)
    );
    capture_first(html, &pattern)
}

fn extract_meta_property(html: &str, property: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<meta[^>]+property\s*=\s*["']{}["'][^>]*content\s*=\s*["']([^"']*)["']"#,
        regex::escape(property)
    );
    capture_first(html, &pattern)
}

fn capture_first(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    let raw = re.captures(html)?.get(1)?.as_str();
    let cleaned = clean_inline(&decode_entities(&TAGS.replace_all(raw, " ")));
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Readable body text: noise blocks removed, tags stripped, one paragraph per line.
///
/// The `<article>` element wins over `<main>`, which wins over `<body>`.
#[must_use]
pub fn extract_readable_text(html: &str) -> String {
    let without_comments = COMMENTS.replace_all(html, " ");
    let without_noise = NOISE_BLOCKS.replace_all(&without_comments, " ");
    let scope = select_scope(&without_noise);

    let with_breaks = BLOCK_BREAKS.replace_all(scope, "\n");
    let stripped = TAGS.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(clean_inline)
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

fn select_scope(html: &str) -> &str {
    for tag in ["article", "main", "body"] {
        if let Some(inner) = inner_of(html, tag) {
            return inner;
        }
    }
    html
}

fn inner_of<'a>(html: &'a str, tag: &str) -> Option<&'a str> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find(&format!("<{tag}"))?;
    let content_start = open + lower[open..].find('>')? + 1;
    let close = lower.rfind(&format!("</{tag}"))?;
    (close > content_start).then(|| &html[content_start..close])
}

fn clean_inline(s: &str) -> String {
    SPACES.replace_all(s.trim(), " ").trim().to_string()
}

/// Decode the handful of named entities that matter for prose, plus numeric ones.
#[must_use]
pub fn decode_entities(s: &str) -> String {
    let named = s
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}")
        .replace("&hellip;", "\u{2026}")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ldquo;", "\u{201c}");

    let numeric = NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = if let Some(hex) = raw.strip_prefix('x') {
            u32::from_str_radix(hex, 16).ok()
        } else {
            raw.parse::<u32>().ok()
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });

    // `&amp;` last so "&amp;lt;" decodes to "&lt;" and not "<".
    numeric.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head>
<title>Fallback Title</title>
<meta property="og:title" content="Why Rust Wins">
<meta name="author" content="Ada Lovelace">
<style>body { color: red; }</style>
<script>var tracking = "ignore me";</script>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/about">About</a></nav>
<article>
<h1>Why Rust Wins</h1>
<p>Memory safety without a garbage collector &amp; zero-cost abstractions.</p>
<p>Fearless&nbsp;concurrency is the <b>second</b> pillar&#8230;</p>
<!-- hidden comment -->
</article>
<footer>Copyright 2026</footer>
</body></html>"#;

    #[test]
    fn title_prefers_og_title() {
        assert_eq!(extract_title(PAGE).as_deref(), Some("Why Rust Wins"));
    }

    #[test]
    fn title_falls_back_to_title_tag() {
        let html = "<html><head><title>  Plain   Title </title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Plain Title"));
    }

    #[test]
    fn author_from_meta() {
        assert_eq!(extract_author(PAGE).as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn readable_text_keeps_article_only() {
        let text = extract_readable_text(PAGE);
        assert!(text.contains("Memory safety without a garbage collector & zero-cost abstractions."));
        assert!(text.contains("Fearless concurrency is the second pillar\u{2026}"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("hidden comment"));
    }

    #[test]
    fn readable_text_one_paragraph_per_line() {
        let text = extract_readable_text(PAGE);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Why Rust Wins");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn body_used_without_article() {
        let html = "<html><body><p>Just a paragraph here.</p></body></html>";
        assert_eq!(extract_readable_text(html), "Just a paragraph here.");
    }

    #[test]
    fn decodes_numeric_and_double_escaped_entities() {
        assert_eq!(decode_entities("it&#39;s &#x41;"), "it's A");
        assert_eq!(decode_entities("&amp;lt;tag&amp;gt;"), "&lt;tag&gt;");
    }
}
