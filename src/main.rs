use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use folio_api::config;
use folio_api::database::{schema, DatabaseManager, PgStore, PortfolioStore};
use folio_api::state::AppState;
use folio_api::storage::{ObjectStore, S3Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio_api=info,tower_http=info")),
        )
        .init();

    let config = config::config()?.clone();
    tracing::info!("Starting folio-api in {:?} mode", config.environment);

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    schema::ensure_schema(database.pool())
        .await
        .context("failed to apply the database schema")?;
    let store: Arc<dyn PortfolioStore> = Arc::new(PgStore::from_manager(&database));

    let storage: Option<Arc<dyn ObjectStore>> = match &config.storage {
        Some(storage) => Some(Arc::new(S3Storage::new(storage))),
        None => {
            tracing::warn!("AWS_S3_BUCKET_NAME/AWS_S3_BUCKET_URL not set; uploads will answer 503");
            None
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = folio_api::app(AppState::new(config, store, storage));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("folio-api listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
