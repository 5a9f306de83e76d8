//! `YouTube` transcript extraction.
//!
//! The watch page embeds the player response JSON, which lists caption tracks
//! with a `baseUrl` pointing at the timed-text XML. We pick a track (English
//! first), fetch it, and concatenate the `<text>` cues.

use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::ScraperError;
use crate::html::decode_entities;

static CAPTION_TRACKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""captionTracks":\s*\[(.*?)\]"#).expect("valid caption tracks regex")
});
static BASE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""baseUrl":\s*"([^"]+)""#).expect("valid baseUrl regex"));
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""author":\s*"([^"]+)""#).expect("valid author regex"));
static VIDEO_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""videoDetails":\s*\{.*?"title":\s*"((?:[^"\\]|\\.)*)""#).expect("valid title regex")
});

/// Transcript text plus the cue-derived duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub duration_secs: u64,
}

/// Find the timed-text URL for the preferred caption track in a watch page.
///
/// English tracks (`lang=en`) win; otherwise the first listed track is used.
#[must_use]
pub fn find_caption_track_url(watch_html: &str) -> Option<String> {
    let tracks = CAPTION_TRACKS.captures(watch_html)?.get(1)?.as_str();
    let urls: Vec<String> = BASE_URL
        .captures_iter(tracks)
        .filter_map(|c| c.get(1).map(|m| unescape_json_str(m.as_str())))
        .collect();

    urls.iter()
        .find(|u| u.contains("lang=en"))
        .or_else(|| urls.first())
        .cloned()
}

pub(crate) fn extract_video_author(watch_html: &str) -> Option<String> {
    AUTHOR
        .captures(watch_html)
        .and_then(|c| c.get(1))
        .map(|m| unescape_json_str(m.as_str()))
}

pub(crate) fn extract_video_title(watch_html: &str) -> Option<String> {
    VIDEO_TITLE
        .captures(watch_html)
        .and_then(|c| c.get(1))
        .map(|m| unescape_json_str(m.as_str()))
}

/// Undo the escapes the player response uses inside JSON strings.
fn unescape_json_str(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| {
        raw.replace("\\u0026", "&")
            .replace("\\/", "/")
            .replace("\\\"", "\"")
    })
}

/// Parse timed-text XML (`<transcript><text start=".." dur="..">..</text></transcript>`).
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] for malformed XML.
pub fn parse_timed_text(xml: &str) -> Result<Transcript, ScraperError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_text = false;
    let mut cues: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut end_secs = 0.0_f64;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"text" => {
                in_text = true;
                current.clear();
                let mut start = 0.0_f64;
                let mut dur = 0.0_f64;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(attr.value.as_ref()).to_string();
                    match attr.key.as_ref() {
                        b"start" => start = value.parse().unwrap_or(0.0),
                        b"dur" => dur = value.parse().unwrap_or(0.0),
                        _ => {}
                    }
                }
                end_secs = end_secs.max(start + dur);
            }
            Event::Text(e) if in_text => {
                let piece = e.unescape().unwrap_or_default();
                current.push_str(&piece);
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                in_text = false;
                // Cues are double-escaped ("&amp;#39;"), so one more decoding pass.
                let cue = decode_entities(&current).replace('\n', " ");
                let cue = cue.trim();
                if !cue.is_empty() {
                    cues.push(cue.to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let duration_secs = end_secs.round() as u64;

    Ok(Transcript {
        text: cues.join(" "),
        duration_secs,
    })
}
