//! # mapas-api: Binary Entry Point
//!
//! Starts the registration service. Configuration comes from the
//! environment; see [`mapas_api::config`].

use anyhow::Context;

use mapas_api::config::AppConfig;
use mapas_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; authentication disabled, anonymous callers act as admin");
    }
    tracing::info!(?config, "configuration loaded");

    let port = config.port;
    let app = mapas_api::app(AppState::with_config(config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("registration service listening on {}", addr);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
