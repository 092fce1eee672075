use anyhow::Context;
use skylane_api::{app, worker, AppState};
use skylane_store::{app_config::Config, BackendClient, SnapshotStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,skylane_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    let backend = BackendClient::new(&config.backend).context("Failed to build backend client")?;
    tracing::info!("Using backend at {}", config.backend.base_url);

    let source: Arc<dyn skylane_core::FlightSource> = Arc::new(backend);
    let feed = Arc::new(SnapshotStore::new());
    let cancel = CancellationToken::new();

    let refresher = tokio::spawn(worker::run_refresh_loop(
        source.clone(),
        feed.clone(),
        config.feed.refresh_interval(),
        cancel.clone(),
    ));

    let app = app(AppState::new(source, feed, config.search.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    refresher.await?;
    Ok(())
}
