//! # Pharmasite Server
//!
//! HTTP surface of the content backend: the public read API with live SSE
//! subscriptions, the session-guarded admin API, image uploads and the AI
//! writing assistant.

pub mod ai;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod observability;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use config::{Config, ConfigError, DEFAULT_CONFIG_NAME};
pub use error::{ApiError, ServerError, ServerResult};
pub use state::AppState;

use pharmasite_store::{StoreBackend, StoreWatcher};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};

/// Build the state from `config` and serve until ctrl-c
pub async fn serve(config: Config, cwd: &Path) -> ServerResult<()> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|_| ServerError::Bind(config.bind.clone()))?;

    let state = AppState::from_config(&config, cwd).await?;
    let _logger = state.bus.spawn_logger();

    let _watcher = match state.store.backend() {
        StoreBackend::File(path) if config.watch_data_file => {
            info!(path = %path.display(), "Watching data file for external edits");
            Some(StoreWatcher::start(state.store.clone())?)
        }
        _ => None,
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Pharmasite server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
