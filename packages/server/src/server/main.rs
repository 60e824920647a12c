// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crawler::{CrawlConfig, HttpFetcher};
use server_core::{server::build_app, server::build_state, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,crawler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Horimono Directory crawl API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Build application
    let mut crawl_config = CrawlConfig::new();
    if let Some(ms) = config.seed_delay_ms {
        crawl_config = crawl_config.with_seed_delay(Duration::from_millis(ms));
    }
    if let Some(ms) = config.page_delay_ms {
        crawl_config = crawl_config.with_page_delay(Duration::from_millis(ms));
    }
    let fetcher = Arc::new(HttpFetcher::from_config(&crawl_config));
    let state = build_state(fetcher, crawl_config, config.max_studios_cap);

    // Hourly sweep keeps the progress store from accumulating dead sessions
    let _sweeper = state
        .progress_store
        .spawn_sweeper(Duration::from_secs(60 * 60));

    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
