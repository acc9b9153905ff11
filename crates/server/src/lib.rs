pub mod api;
pub mod bootstrap;
pub mod session;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use gfv_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use gfv_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let bootstrap::Application { config, session, analysis } = app;

    if session.local_mode() {
        // Continuous signal, not a one-time warning: /api/estado carries the
        // flag for the views on every read.
        tracing::warn!(
            event_name = "console.local_mode",
            "persistence disabled; records live only for this session"
        );
    }

    let state = api::ApiState { session: Arc::new(RwLock::new(session)), analysis };
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind((
        config.server.bind_address.as_str(),
        config.server.port,
    ))
    .await?;
    tracing::info!(
        event_name = "console.server.started",
        bind_address = %config.server.bind_address,
        port = config.server.port,
        "console API listening"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "console.server.stopping", "console API stopping");
    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
