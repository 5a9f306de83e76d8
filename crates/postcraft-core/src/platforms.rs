use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, CoreError};

/// A social network a post can be drafted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    #[serde(alias = "x")]
    Twitter,
    Instagram,
    Threads,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Instagram,
        Platform::Threads,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Threads => "threads",
        }
    }

    /// Human-readable name used inside prompts.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Linkedin => "LinkedIn",
            Platform::Twitter => "X (Twitter)",
            Platform::Instagram => "Instagram",
            Platform::Threads => "Threads",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Platform::Linkedin),
            "twitter" | "x" => Ok(Platform::Twitter),
            "instagram" => Ok(Platform::Instagram),
            "threads" => Ok(Platform::Threads),
            other => Err(CoreError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Length and hashtag limits for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRules {
    pub max_chars: usize,
    pub max_hashtags: usize,
    #[serde(default)]
    pub style_notes: String,
}

impl PlatformRules {
    #[must_use]
    pub fn default_for(platform: Platform) -> Self {
        match platform {
            Platform::Twitter => Self {
                max_chars: 280,
                max_hashtags: 2,
                style_notes: "Short and punchy. One idea. No more than two hashtags.".to_string(),
            },
            Platform::Linkedin => Self {
                max_chars: 3000,
                max_hashtags: 5,
                style_notes: "Professional tone, short paragraphs, line breaks between ideas."
                    .to_string(),
            },
            Platform::Instagram => Self {
                max_chars: 2200,
                max_hashtags: 30,
                style_notes: "Caption style, emojis welcome, hashtags grouped at the end."
                    .to_string(),
            },
            Platform::Threads => Self {
                max_chars: 500,
                max_hashtags: 3,
                style_notes: "Conversational, casual, invites replies.".to_string(),
            },
        }
    }
}

/// The rule table for every platform, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<Platform, PlatformRules>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Platform::ALL
                .iter()
                .map(|&p| (p, PlatformRules::default_for(p)))
                .collect(),
        }
    }
}

impl RuleSet {
    #[must_use]
    pub fn get(&self, platform: Platform) -> PlatformRules {
        self.rules
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| PlatformRules::default_for(platform))
    }

    fn with_overrides(overrides: &[PlatformOverride]) -> Self {
        let mut set = Self::default();
        for o in overrides {
            set.rules.insert(o.platform, o.rules.clone());
        }
        set
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformOverride {
    pub platform: Platform,
    #[serde(flatten)]
    pub rules: PlatformRules,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRulesFile {
    pub platforms: Vec<PlatformOverride>,
}

/// Load platform rule overrides from a YAML file and merge them over the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_platform_rules(path: &Path) -> Result<RuleSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_platform_rules(&content)
}

fn parse_platform_rules(content: &str) -> Result<RuleSet, ConfigError> {
    let file: PlatformRulesFile =
        serde_yaml::from_str(content).map_err(ConfigError::PlatformsFileParse)?;
    validate_overrides(&file)?;
    Ok(RuleSet::with_overrides(&file.platforms))
}

fn validate_overrides(file: &PlatformRulesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for o in &file.platforms {
        if !seen.insert(o.platform) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform entry: '{}'",
                o.platform
            )));
        }
        if o.rules.max_chars == 0 {
            return Err(ConfigError::Validation(format!(
                "platform '{}' has max_chars 0; must be positive",
                o.platform
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_x_as_twitter() {
        assert_eq!("x".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!(" LinkedIn ".parse::<Platform>().unwrap(), Platform::Linkedin);
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = "myspace".parse::<Platform>().unwrap_err();
        assert_eq!(err, CoreError::UnknownPlatform("myspace".to_string()));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Instagram).unwrap();
        assert_eq!(json, "\"instagram\"");
        let parsed: Platform = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(parsed, Platform::Twitter);
    }

    #[test]
    fn default_rules_cover_every_platform() {
        let set = RuleSet::default();
        assert_eq!(set.get(Platform::Twitter).max_chars, 280);
        assert_eq!(set.get(Platform::Threads).max_chars, 500);
        assert_eq!(set.get(Platform::Instagram).max_hashtags, 30);
    }

    #[test]
    fn yaml_override_replaces_one_platform() {
        let yaml = "platforms:\n  - platform: twitter\n    max_chars: 25000\n    max_hashtags: 3\n";
        let set = parse_platform_rules(yaml).expect("valid yaml");
        assert_eq!(set.get(Platform::Twitter).max_chars, 25_000);
        assert_eq!(set.get(Platform::Linkedin).max_chars, 3000);
    }

    #[test]
    fn yaml_rejects_duplicates() {
        let yaml = "platforms:\n  - platform: twitter\n    max_chars: 280\n    max_hashtags: 2\n  - platform: x\n    max_chars: 300\n    max_hashtags: 2\n";
        let err = parse_platform_rules(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate platform"));
    }

    #[test]
    fn yaml_rejects_zero_limit() {
        let yaml = "platforms:\n  - platform: threads\n    max_chars: 0\n    max_hashtags: 2\n";
        let err = parse_platform_rules(yaml).unwrap_err();
        assert!(err.to_string().contains("max_chars 0"));
    }
}
