//! Keep-alive HTTP endpoint.
//!
//! Hosting platforms that idle a process without inbound traffic get pinged
//! here. The routes carry no bot state beyond uptime.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use marquee_error::{HttpError, MarqueeResult};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// API state shared by the routes.
#[derive(Debug, Clone, Copy)]
pub struct ApiState {
    started_at: Instant,
}

impl ApiState {
    /// State whose uptime counts from now.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the keep-alive router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn root() -> &'static str {
    "Marquee is running"
}

/// Health check endpoint.
async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "uptime_secs": state.started_at.elapsed().as_secs(),
        })),
    )
}

/// Bind `addr` and serve `router` until the process exits.
#[instrument(skip(router))]
pub async fn serve(addr: SocketAddr, router: Router) -> MarqueeResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| HttpError::new(format!("Failed to bind {}: {}", addr, e)))?;
    serve_listener(listener, router).await
}

/// Serve `router` on an already bound listener.
pub async fn serve_listener(listener: TcpListener, router: Router) -> MarqueeResult<()> {
    if let Ok(local) = listener.local_addr() {
        info!(addr = %local, "Keep-alive server listening");
    }
    axum::serve(listener, router)
        .await
        .map_err(|e| HttpError::new(format!("Keep-alive server failed: {}", e)))?;
    Ok(())
}
