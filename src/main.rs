use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tube_grab::{AppConfig, AppState, Orchestrator, YtDlpProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; a broken one is not.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to load .env");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        listen = %config.listen_addr,
        max_bytes = config.download.max_bytes,
        ladder = ?config.download.ladder.tiers(),
        token = config.extractor.po_token.is_some(),
        "configuration loaded"
    );

    let provider = YtDlpProvider::new(config.extractor.clone());
    tracing::info!(binary = provider.ytdlp_path(), "provider ready");

    let orchestrator = Orchestrator::new(Arc::new(provider), Arc::new(config.download.clone()));
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    tube_grab::serve(listener, AppState::new(orchestrator)).await
}
