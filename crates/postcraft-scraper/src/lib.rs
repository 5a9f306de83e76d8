//! Scrape stage: turn a URL into plain text plus metadata.
//!
//! The source kind is chosen from the URL shape ([`detect_source_kind`]):
//! YouTube links fetch the caption transcript, feed-looking links are parsed
//! as RSS/Atom, everything else is fetched as HTML and reduced to readable text.

pub mod client;
pub mod detect;
pub mod error;
pub mod feed;
pub mod html;
mod rate_limit;
pub mod types;
pub mod youtube;

pub use client::ScraperClient;
pub use detect::{detect_source_kind, youtube_video_id};
pub use error::ScraperError;
pub use types::{ScrapeMetadata, ScrapedContent, SourceKind};
