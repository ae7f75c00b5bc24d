//! imago-search server entry point.
//!
//! Boots the mirror: loads configuration, spawns the background refresh
//! loop, and serves the search endpoint. Logging goes to stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use imago_client::{Crawler, spawn_refresh_loop};
use imago_core::{AppConfig, CatalogStore};

mod error;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    tracing::info!("starting imago mirror of {}", config.resource_url());

    let store = CatalogStore::new();
    let crawler = Arc::new(Crawler::from_config(&config, store.clone())?);
    spawn_refresh_loop(crawler, config.refresh_interval());

    let app = routes::router(routes::AppState { store });
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("search endpoint listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
