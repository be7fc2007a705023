//! ai-sentiment-analyzer - sentiment analysis gateway
//!
//! Serves the web UI and forwards text and images to the configured
//! inference services.

use std::net::SocketAddr;

use ai_sentiment_analyzer::{backend, config::Config, db, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_sentiment_analyzer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    config.validate()?;

    info!("Starting ai-sentiment-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        sentiment_backend = config.sentiment_backend.as_str(),
        caption_backend = config.caption_backend.as_str(),
        timeout_secs = config.upstream_timeout_secs,
        "Backends configured"
    );

    let http = backend::http_client(&config).context("Failed to build HTTP client")?;
    let sentiment = backend::sentiment_backend(&config, http.clone());
    let captioner = backend::caption_backend(&config, http);

    let pool = db::init_database_pool(config.database_url.as_deref())
        .await
        .context("Failed to initialize upload database")?;
    info!("Upload database ready");

    let state = AppState::new(sentiment, captioner, db::UploadStore::new(pool))
        .with_body_limit(config.body_limit_bytes());
    let app = ai_sentiment_analyzer::build_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
