// =============================================================================
// SVF Dashboard — Main Entry Point
// =============================================================================
//
// Serves the stock visualization dashboard: a form, a Plotly chart fed from
// the market-data provider, and two static pages. The server holds no
// per-user state; each submit is answered from the request alone.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chart;
mod config;
mod dashboard;
mod market_data;
mod provider;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::DashboardConfig;
use crate::provider::{MarketDataProvider, YahooClient};

const CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("SVF dashboard starting up");

    // ── 2. Config ────────────────────────────────────────────────────────
    let mut config = DashboardConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });
    config.apply_env();

    info!(
        provider = %config.provider_base_url,
        timeout_secs = ?config.request_timeout_secs,
        default_indicators = ?config.default_indicators,
        "Configuration resolved"
    );

    // ── 3. Market data provider ──────────────────────────────────────────
    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooClient::new(&config)?);

    // ── 4. HTTP server ───────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, provider));
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Dashboard listening");

    // ── 5. Serve until Ctrl+C ────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("SVF dashboard shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
