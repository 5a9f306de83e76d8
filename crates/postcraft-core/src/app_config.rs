use std::net::SocketAddr;
use std::path::PathBuf;

use crate::platforms::Platform;
use crate::styles::PostStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the scoring stage produces a virality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Ask the model for per-criterion scores; fall back to the heuristic on bad output.
    Model,
    /// Never call the model; use the hook/CTA/length formula.
    Heuristic,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub api_key_hash_salt: Option<String>,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_retry_base_ms: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_base_ms: u64,
    pub batch_chunk_size: usize,
    pub batch_overlap: usize,
    pub batch_max_batches: usize,
    pub optimize_threshold: u8,
    pub scoring_mode: ScoringMode,
    pub default_platforms: Vec<Platform>,
    pub post_styles: Vec<PostStyle>,
    pub platforms_path: Option<PathBuf>,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "api_key_hash_salt",
                &self.api_key_hash_salt.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("llm_retry_base_ms", &self.llm_retry_base_ms)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field("scraper_retry_base_ms", &self.scraper_retry_base_ms)
            .field("batch_chunk_size", &self.batch_chunk_size)
            .field("batch_overlap", &self.batch_overlap)
            .field("batch_max_batches", &self.batch_max_batches)
            .field("optimize_threshold", &self.optimize_threshold)
            .field("scoring_mode", &self.scoring_mode)
            .field("default_platforms", &self.default_platforms)
            .field("post_styles", &self.post_styles)
            .field("platforms_path", &self.platforms_path)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
