//! HTTP server: routes, shared state and startup.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{
    ConvertRequest, ConvertResponse, HealthResponse, ProviderStatus, StylizeResponse,
};

use crate::config::Config;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by all requests. Immutable after startup.
#[derive(Debug)]
pub struct AppState {
    /// Credentials, base URLs and limits.
    pub config: Config,
    /// HTTP client shared by all provider calls.
    pub client: reqwest::Client,
}

impl AppState {
    /// Creates state with a fresh HTTP client.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/api/health", get(handlers::health_handler))
        .route("/api/stylize", post(handlers::stylize_handler))
        .route("/api/convert", post(handlers::convert_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the application on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, config: Config) -> std::io::Result<()> {
    tracing::info!(?config, "starting server");
    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
