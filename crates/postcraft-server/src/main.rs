mod api;
mod middleware;

use std::net::SocketAddr;
use std::sync::Arc;

use postcraft_core::{load_platform_rules, RuleSet};
use postcraft_llm::{LlmClient, RetryPolicy};
use postcraft_pipeline::{Pipeline, PipelineConfig};
use postcraft_scraper::ScraperClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = postcraft_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let rules = match &config.platforms_path {
        Some(path) => load_platform_rules(path)?,
        None => RuleSet::default(),
    };

    let llm = LlmClient::new(
        &config.llm_api_key,
        &config.llm_base_url,
        &config.llm_model,
        config.llm_timeout_secs,
        RetryPolicy {
            max_retries: config.llm_max_retries,
            base_delay_ms: config.llm_retry_base_ms,
            jitter: true,
        },
    )?;
    let scraper = ScraperClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_base_ms,
    )?;
    let pipeline = Pipeline::new(llm, scraper, PipelineConfig::from_app_config(&config, rules));

    let auth = AuthState::from_env(
        matches!(config.env, postcraft_core::Environment::Development),
        config.api_key_hash_salt.as_deref(),
    )?;
    let app = build_app(
        AppState {
            pipeline: Arc::new(pipeline),
        },
        auth,
        rate_limit_state(config.rate_limit_per_minute),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, model = %config.llm_model, "postcraft server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
