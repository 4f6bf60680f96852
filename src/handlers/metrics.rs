use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::Json,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use tracing::info;

use super::types::MetricsResponse;
use super::{authorize, ApiError};
use crate::server::state::AppState;

/// Get metrics endpoint
pub async fn get_metrics(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<MetricsResponse>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "metrics request")?;

    info!("Metrics requested from {}", real_ip);
    let metrics = &state.metrics;
    Ok(Json(MetricsResponse {
        state_reads: metrics.state_reads.load(Ordering::Relaxed),
        admin_writes: metrics.admin_writes.load(Ordering::Relaxed),
        admin_errors: metrics.admin_errors.load(Ordering::Relaxed),
        rejected_requests: metrics.rejected_requests.load(Ordering::Relaxed),
        health_checks: metrics.health_checks.load(Ordering::Relaxed),
    }))
}
