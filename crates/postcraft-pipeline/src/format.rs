//! Platform compliance: hashtag trimming and character truncation.

use std::sync::LazyLock;

use postcraft_core::PlatformRules;
use regex::Regex;

use crate::events::Compliance;
use crate::metadata::extract_hashtags;

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));
static RUN_OF_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid spaces regex"));

const ELLIPSIS: char = '…';

/// Bring `content` within `rules`: drop hashtags past `max_hashtags`, then
/// truncate to `max_chars` characters, ending in `…` when cut.
#[must_use]
pub fn enforce_rules(content: &str, rules: &PlatformRules) -> String {
    let trimmed = trim_hashtags(content, rules.max_hashtags);
    truncate_chars(&trimmed, rules.max_chars)
}

/// Keep the first `max` hashtags and remove the rest.
#[must_use]
pub fn trim_hashtags(content: &str, max: usize) -> String {
    if HASHTAG.find_iter(content).count() <= max {
        return content.to_string();
    }
    let mut seen = 0usize;
    let stripped = HASHTAG.replace_all(content, |caps: &regex::Captures<'_>| {
        seen += 1;
        if seen <= max {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let collapsed = RUN_OF_SPACES.replace_all(&stripped, " ");
    collapsed
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Cut `content` to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = content.chars().take(max_chars - 1).collect();
    let mut out = kept.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

#[must_use]
pub fn check_compliance(content: &str, rules: &PlatformRules) -> Compliance {
    let char_count = content.chars().count();
    let hashtag_count = extract_hashtags(content).len();
    Compliance {
        char_count,
        max_chars: rules.max_chars,
        within_limit: char_count <= rules.max_chars,
        hashtag_count,
        max_hashtags: rules.max_hashtags,
        hashtags_ok: hashtag_count <= rules.max_hashtags,
    }
}
