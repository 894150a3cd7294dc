mod config;
mod db;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::services::persistence;
use crate::state::{AppState, StatusBook};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();

    // Without a database the book lives only in memory.
    let (pool, book) = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections).await?;
            let book = persistence::hydrate_book(&pool, config.seed_mock_data).await?;
            (Some(pool), book)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; statuses are kept in memory only");
            let mut book = StatusBook::new();
            if config.seed_mock_data {
                persistence::seed_book(&mut book, false);
            }
            (None, book)
        }
    };

    if book.is_empty() {
        tracing::info!("status book starts empty");
    } else {
        tracing::info!(statuses = book.len(), "status book ready");
    }

    let state = AppState::new(pool.clone(), book);

    // Spawn background persistence task.
    let _persistence =
        pool.map(|pool| persistence::spawn_persistence_task(state.clone(), pool, config.flush_interval_ms));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "status tracker listening");
    axum::serve(listener, app).await?;
    Ok(())
}
