mod app;
mod domain;
mod game;
mod infrastructure;
mod models;
mod shared;
mod web_socket;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

use crate::game::TableRegistry;
use crate::infrastructure::MemoryStore;
use crate::shared::{SERVER_ADDRESS, SERVER_PORT};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let storage = Arc::new(MemoryStore::new());
    let registry = Arc::new(TableRegistry::new(storage));

    let app = app::create_routes(registry);

    let addr: SocketAddr = format!("{SERVER_ADDRESS}:{SERVER_PORT}").parse()?;

    tracing::info!(%addr, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    tracing::info!("received shutdown signal");
}
