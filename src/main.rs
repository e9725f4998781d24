use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use region_grants::config::ServerConfig;
use region_grants::http;
use region_grants::logging;
use region_grants::region::RegionCatalog;
use region_grants::DistributionService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = logging::init_logging(config.log_format)?;

    tracing::info!("=== Region Grants Starting ===");

    let catalog = RegionCatalog::load(&config.regions_csv)
        .await
        .with_context(|| format!("Failed to load region catalog from {:?}", config.regions_csv))?;
    if catalog.is_empty() {
        tracing::warn!("Region catalog is empty; every region lookup will fail");
    }

    let service = Arc::new(DistributionService::new(Arc::new(catalog)));
    let app = http::router(service, config.rate_limit);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "Listening on {} (rate limit: {} requests/minute)",
        addr,
        config.rate_limit
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("=== Region Grants Shutting Down ===");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
