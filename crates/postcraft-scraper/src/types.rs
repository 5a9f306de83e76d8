use serde::{Deserialize, Serialize};

/// Where scraped text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    Youtube,
    Rss,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Web => write!(f, "web"),
            SourceKind::Youtube => write!(f, "youtube"),
            SourceKind::Rss => write!(f, "rss"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub word_count: usize,
    pub char_count: usize,
    /// Number of feed entries folded into the content (RSS only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    /// Transcript length in whole seconds (YouTube only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// Raw text and metadata produced once per pipeline run; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub source: String,
    pub content: String,
    pub metadata: ScrapeMetadata,
}

impl ScrapedContent {
    /// Builds a successful result, filling in word and character counts.
    #[must_use]
    pub fn new(kind: SourceKind, source: &str, content: String, mut metadata: ScrapeMetadata) -> Self {
        metadata.word_count = content.split_whitespace().count();
        metadata.char_count = content.chars().count();
        Self {
            success: true,
            kind,
            source: source.to_string(),
            content,
            metadata,
        }
    }
}
