//! Axum HTTP server for the REST API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::controller::ControllerState;
use crate::error::{Error, Result};

use super::handlers;

/// Metrics endpoint handler
#[cfg(feature = "metrics")]
async fn metrics_handler() -> std::result::Result<String, axum::http::StatusCode> {
    use prometheus_client::encoding::text::encode;

    let mut buffer = String::new();
    encode(&mut buffer, &crate::controller::metrics::REGISTRY).map_err(|e| {
        tracing::error!("Failed to encode metrics: {}", e);
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(buffer)
}

fn router(state: Arc<ControllerState>) -> Router {
    let router = Router::new().route("/health", get(handlers::health));

    #[cfg(feature = "metrics")]
    let router = router.route("/metrics", get(metrics_handler));

    router
        .route("/api/v1/validators", get(handlers::list_validators))
        .route(
            "/api/v1/validators/{namespace}/{name}",
            get(handlers::get_validator),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the REST API server on `port`
pub async fn run_server(state: Arc<ControllerState>, port: u16) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("REST API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::ConfigError(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::ConfigError(format!("Server error: {}", e)))?;

    Ok(())
}
