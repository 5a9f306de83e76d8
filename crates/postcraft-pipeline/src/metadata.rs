//! Deterministic post features: hook, call to action, hashtags, emojis, layout.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));

static CTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(comment|share|follow|click|check|learn|join|subscribe|sign up|download|try|read|visit|tag|dm|let me know|what do you think)\b",
    )
    .expect("valid cta regex")
});

static THREAD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*/").expect("valid thread line regex"));

static LIST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s").expect("valid list line regex"));

/// A first line longer than this counts as a hook.
const HOOK_MIN_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFormat {
    SingleLine,
    MultiParagraph,
    List,
    Thread,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub has_hook: bool,
    pub format: PostFormat,
    pub hashtags: Vec<String>,
    pub word_count: usize,
    pub has_emojis: bool,
    pub has_cta: bool,
}

/// Derive [`PostMetadata`] from post text. Pure.
#[must_use]
pub fn extract_post_metadata(text: &str) -> PostMetadata {
    let has_hook = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.chars().count() > HOOK_MIN_CHARS);

    PostMetadata {
        has_hook,
        format: detect_format(text),
        hashtags: extract_hashtags(text),
        word_count: text.split_whitespace().count(),
        has_emojis: text.chars().any(is_emoji),
        has_cta: CTA.is_match(text),
    }
}

/// Hashtags in order of appearance, duplicates kept.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn detect_format(text: &str) -> PostFormat {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.iter().filter(|l| THREAD_LINE.is_match(l)).count() >= 2 {
        return PostFormat::Thread;
    }
    if lines.iter().filter(|l| LIST_LINE.is_match(l)).count() >= 2 {
        return PostFormat::List;
    }
    if lines.len() > 1 {
        PostFormat::MultiParagraph
    } else {
        PostFormat::SingleLine
    }
}

fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x1F000..=0x1F2FF
    )
}
