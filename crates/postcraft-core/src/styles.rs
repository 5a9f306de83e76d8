use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Writing style requested for one generated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStyle {
    Viral,
    Professional,
    Punchy,
    Story,
    Thread,
}

impl PostStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStyle::Viral => "viral",
            PostStyle::Professional => "professional",
            PostStyle::Punchy => "punchy",
            PostStyle::Story => "story",
            PostStyle::Thread => "thread",
        }
    }

    /// Instruction fragment describing the style to the model.
    #[must_use]
    pub fn guidance(self) -> &'static str {
        match self {
            PostStyle::Viral => {
                "Open with a bold, curiosity-driven hook. Aim for shares and comments."
            }
            PostStyle::Professional => {
                "Authoritative and insightful. Lead with the key takeaway, back it with specifics."
            }
            PostStyle::Punchy => "Very short sentences. High energy. Cut every filler word.",
            PostStyle::Story => {
                "Tell it as a short narrative with a clear turning point and lesson."
            }
            PostStyle::Thread => {
                "Structure as a numbered sequence of short connected points (1/, 2/, ...)."
            }
        }
    }
}

impl std::fmt::Display for PostStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viral" => Ok(PostStyle::Viral),
            "professional" => Ok(PostStyle::Professional),
            "punchy" => Ok(PostStyle::Punchy),
            "story" => Ok(PostStyle::Story),
            "thread" => Ok(PostStyle::Thread),
            other => Err(CoreError::UnknownStyle(other.to_string())),
        }
    }
}
