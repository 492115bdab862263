use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::RestConfig;
use casematch_core::{
    config::{
        corpus_path_from_env_value, demographics_basis_from_env_value,
        outcome_resolution_from_env_value,
    },
    CaseStatisticsService, CoreConfig,
};

/// Main entry point for the casematch application
///
/// Resolves configuration once, loads the case corpus and serves the REST API.
/// A missing or unreadable corpus is logged and replaced by an empty one; the server still
/// starts and every statistic reports zero counts.
///
/// # Environment Variables
/// - `CASEMATCH_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CASEMATCH_CORPUS_PATH`: JSON corpus file (default: none, empty corpus)
/// - `CASEMATCH_OUTCOME_RESOLUTION`: `id` (default) or `id_then_chief_complaint`
/// - `CASEMATCH_DEMOGRAPHICS`: `illustrative` (default) or `observed`
/// - `CASEMATCH_MAX_TOP_K`: upper bound on a request's `topK` (default: 200)
/// - `CASEMATCH_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casematch=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CASEMATCH_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        corpus_path_from_env_value(std::env::var("CASEMATCH_CORPUS_PATH").ok()),
        outcome_resolution_from_env_value(std::env::var("CASEMATCH_OUTCOME_RESOLUTION").ok())?,
        demographics_basis_from_env_value(std::env::var("CASEMATCH_DEMOGRAPHICS").ok())?,
    ));

    let rest_cfg = RestConfig {
        max_top_k: api_rest::max_top_k_from_env_value(std::env::var("CASEMATCH_MAX_TOP_K").ok())?,
        request_timeout: api_rest::request_timeout_from_env_value(
            std::env::var("CASEMATCH_REQUEST_TIMEOUT_SECS").ok(),
        )?,
    };

    let service = Arc::new(CaseStatisticsService::from_config(cfg));

    tracing::info!(
        cases = service.corpus().len(),
        max_top_k = rest_cfg.max_top_k,
        "++ Starting casematch REST on {}",
        rest_addr
    );

    let app = api_rest::router(service, rest_cfg);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down casematch REST");
}
