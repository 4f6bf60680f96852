use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::Json,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use tracing::debug;

use super::types::HealthResponse;
use super::{authorize, ApiError};
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<HealthResponse>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "health check")?;

    state.metrics.health_checks.fetch_add(1, Ordering::Relaxed);
    debug!("Health check from {}", real_ip);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        networks: state.registry.all().len(),
    }))
}
