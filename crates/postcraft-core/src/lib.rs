//! Shared configuration and domain vocabulary for postcraft.
//!
//! Everything here is plain data: the environment-driven [`AppConfig`], the
//! [`Platform`] and [`PostStyle`] enumerations, and the per-platform
//! [`PlatformRules`] that the formatting stage enforces.

pub mod app_config;
pub mod backoff;
pub mod config;
pub mod platforms;
pub mod styles;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ScoringMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use platforms::{load_platform_rules, Platform, PlatformRules, PlatformRulesFile, RuleSet};
pub use styles::PostStyle;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read platforms file {path}: {source}")]
    PlatformsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse platforms file: {0}")]
    PlatformsFileParse(#[source] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown post style: {0}")]
    UnknownStyle(String),
}
