use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hoplink::{config::AppConfig, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hoplink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    tracing::info!("Starting hoplink on {}:{}", config.host, config.port);
    tracing::info!("Base URL: {}", config.base_url);
    tracing::info!(
        "Store backend: {} (codes: {} chars)",
        config.storage_backend,
        config.code_length
    );

    let bind_addr = format!("{}:{}", config.host, config.port);

    // Build the configured store (opens the pool and applies migrations for
    // the SQLite backend)
    let link_store = store::from_config(&config).await?;

    let state = Arc::new(AppState {
        config,
        store: link_store,
    });

    let app = hoplink::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
