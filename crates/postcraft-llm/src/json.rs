//! Lenient JSON extraction from free-text model replies.
//!
//! Models wrap JSON in prose or markdown fences often enough that replies are
//! never parsed directly. The slice from the first `{` to the last `}` is
//! taken instead (greedy), which also tolerates fenced blocks.

use serde::de::DeserializeOwned;

/// Greedy slice from the first `{` to the last `}` in `text`.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract and deserialize the JSON object embedded in `text`.
///
/// Returns `None` when no object is present or it does not match `T`; callers
/// substitute their own fallback.
#[must_use]
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Option<T> {
    let raw = extract_json_object(text)?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "model reply did not match expected JSON shape");
            None
        }
    }
}
