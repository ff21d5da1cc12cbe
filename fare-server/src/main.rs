use std::error::Error;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fare_server::config::ServerConfig;
use fare_server::store::{RouteStore, Snapshot};
use fare_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine; the environment may be set directly.
    let dotenv = dotenvy::dotenv();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = dotenv
        && !e.not_found()
    {
        warn!("Failed to read .env file: {e}");
    }

    let config = ServerConfig::from_env().inspect_err(|e| error!("Bad configuration: {e}"))?;

    let store = match &config.data_file {
        Some(path) => RouteStore::open(Snapshot::new(path))
            .inspect_err(|e| error!("Failed to load routes: {e}"))?,
        None => {
            warn!("No data file configured, routes will be lost on shutdown");
            RouteStore::in_memory()
        }
    };
    info!("Loaded {} routes", store.len().await);

    let app = create_router(AppState::new(store), &config.static_dir);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {e}", config.bind_addr))?;
    info!("Bus Fare Finder listening on http://{}", config.bind_addr);
    info!("API Endpoints:");
    info!("  GET  /health                  - Health check");
    info!("  GET  /api/routes/list         - Route numbers and names");
    info!("  POST /api/routes/search-fare  - Fare between two cities");
    info!("  *    /api/routes[/:id]        - Route management");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
