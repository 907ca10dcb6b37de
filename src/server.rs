//! # Server Configuration
//!
//! Router assembly and the HTTP listener for the Connector Console.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use thiserror::Error;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api_client::ConnectorApi;
use crate::config::AppConfig;
use crate::handlers::{self, connections, oauth};
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn ConnectorApi>,
}

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid server address: {0}")]
    InvalidBindAddr(#[from] std::net::AddrParseError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/healthz", get(handlers::healthz))
        .route("/connectors/{key}", get(handlers::connector_page))
        .route(
            "/connections",
            get(connections::list_connections).post(connections::create_connection),
        )
        .route("/connections/{id}", post(connections::update_connection))
        .route(
            "/connections/{id}/delete",
            get(connections::confirm_delete).post(connections::delete_connection),
        )
        .route("/connections/{id}/test", post(connections::test_connection))
        .route("/oauth/initiate", post(oauth::initiate))
        .route("/oauth/callback", get(oauth::callback))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(trace_context_middleware))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, api: Arc<dyn ConnectorApi>) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;
    let profile = config.profile.clone();
    let api_base_url = config.api_base_url.clone();

    let state = AppState {
        config: Arc::new(config),
        api,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, %profile, backend = %api_base_url, "Connector console listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
