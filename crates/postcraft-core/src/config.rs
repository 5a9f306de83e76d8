use crate::app_config::{AppConfig, Environment, ScoringMode};
use crate::platforms::Platform;
use crate::styles::PostStyle;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let llm_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("POSTCRAFT_ENV", "development"))?;
    let bind_addr = or_default("POSTCRAFT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("POSTCRAFT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("POSTCRAFT_LOG_LEVEL", "info");
    let api_key_hash_salt = lookup("POSTCRAFT_API_KEY_HASH_SALT").ok();

    let llm_base_url = or_default(
        "POSTCRAFT_LLM_BASE_URL",
        "https://generativelanguage.googleapis.com/v1beta/openai/",
    );
    let llm_model = or_default("POSTCRAFT_LLM_MODEL", "gemini-2.0-flash");
    let llm_timeout_secs = parse_u64("POSTCRAFT_LLM_TIMEOUT_SECS", "60")?;
    let llm_max_retries = parse_u32("POSTCRAFT_LLM_MAX_RETRIES", "3")?;
    let llm_retry_base_ms = parse_u64("POSTCRAFT_LLM_RETRY_BASE_MS", "500")?;

    let scraper_request_timeout_secs = parse_u64("POSTCRAFT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "POSTCRAFT_SCRAPER_USER_AGENT",
        "Mozilla/5.0 (compatible; postcraft/0.1; +content-drafting)",
    );
    let scraper_max_retries = parse_u32("POSTCRAFT_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_base_ms = parse_u64("POSTCRAFT_SCRAPER_RETRY_BASE_MS", "500")?;

    let batch_chunk_size = parse_usize("POSTCRAFT_BATCH_CHUNK_SIZE", "8000")?;
    let batch_overlap = parse_usize("POSTCRAFT_BATCH_OVERLAP", "500")?;
    let batch_max_batches = parse_usize("POSTCRAFT_BATCH_MAX_BATCHES", "10")?;
    if batch_chunk_size == 0 || batch_overlap >= batch_chunk_size {
        return Err(invalid(
            "POSTCRAFT_BATCH_OVERLAP",
            format!("overlap {batch_overlap} must be smaller than chunk size {batch_chunk_size}"),
        ));
    }
    if batch_max_batches == 0 {
        return Err(invalid(
            "POSTCRAFT_BATCH_MAX_BATCHES",
            "must be at least 1".to_string(),
        ));
    }

    let optimize_threshold = or_default("POSTCRAFT_OPTIMIZE_THRESHOLD", "70")
        .parse::<u8>()
        .map_err(|e| invalid("POSTCRAFT_OPTIMIZE_THRESHOLD", e.to_string()))?;
    if optimize_threshold > 100 {
        return Err(invalid(
            "POSTCRAFT_OPTIMIZE_THRESHOLD",
            format!("{optimize_threshold} is outside 0-100"),
        ));
    }

    let scoring_mode = parse_scoring_mode(&or_default("POSTCRAFT_SCORING_MODE", "model"))?;

    let default_platforms = parse_list(
        "POSTCRAFT_DEFAULT_PLATFORMS",
        &or_default("POSTCRAFT_DEFAULT_PLATFORMS", "linkedin,twitter"),
        |s| s.parse::<Platform>().map_err(|e| e.to_string()),
    )?;
    let post_styles = parse_list(
        "POSTCRAFT_POST_STYLES",
        &or_default("POSTCRAFT_POST_STYLES", "viral,professional,punchy"),
        |s| s.parse::<PostStyle>().map_err(|e| e.to_string()),
    )?;

    let platforms_path = lookup("POSTCRAFT_PLATFORMS_PATH").ok().map(PathBuf::from);
    let rate_limit_per_minute = parse_usize("POSTCRAFT_RATE_LIMIT_PER_MINUTE", "10")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_key_hash_salt,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        llm_max_retries,
        llm_retry_base_ms,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_base_ms,
        batch_chunk_size,
        batch_overlap,
        batch_max_batches,
        optimize_threshold,
        scoring_mode,
        default_platforms,
        post_styles,
        platforms_path,
        rate_limit_per_minute,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POSTCRAFT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_scoring_mode(s: &str) -> Result<ScoringMode, ConfigError> {
    match s {
        "model" => Ok(ScoringMode::Model),
        "heuristic" => Ok(ScoringMode::Heuristic),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POSTCRAFT_SCORING_MODE".to_string(),
            reason: format!("expected 'model' or 'heuristic', got '{other}'"),
        }),
    }
}

/// Parse a comma-separated list, rejecting empty results and duplicates.
fn parse_list<T, P>(var: &str, raw: &str, parse_one: P) -> Result<Vec<T>, ConfigError>
where
    T: PartialEq,
    P: Fn(&str) -> Result<T, String>,
{
    let mut out = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let value = parse_one(item).map_err(|reason| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason,
        })?;
        if !out.contains(&value) {
            out.push(value);
        }
    }
    if out.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "list must not be empty".to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
