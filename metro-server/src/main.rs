use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use metro_server::config::ServerConfig;
use metro_server::loader::FileStore;
use metro_server::service::MetroService;
use metro_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("metro_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store = FileStore::new(config.data_dir.clone());
    info!(
        data_dir = %config.data_dir.display(),
        capacity = config.cache.capacity,
        "Serving networks from disk"
    );

    let service = Arc::new(MetroService::new(store, config.cache, &config.catalog));
    let state = AppState::new(Arc::clone(&service), config.suggest_limit);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Metro server listening");
    info!("  GET  /health");
    info!("  GET  /api/networks");
    info!("  GET  /api/networks/:network/stations?q=");
    info!("  GET  /api/networks/:network/route?from=&to=");
    info!("  GET  /api/cache");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.close();
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
