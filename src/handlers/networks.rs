use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::Json,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use tracing::info;

use super::types::NetworkSummary;
use super::{authorize, ApiError};
use crate::controller::ControllerSnapshot;
use crate::server::state::AppState;

/// List the registry with each family's wallet connection
pub async fn list_networks(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Vec<NetworkSummary>>, ApiError> {
    authorize(&state, &headers, &addr, "network listing")?;

    let mut networks = Vec::with_capacity(state.registry.all().len());
    for descriptor in state.registry.all() {
        let account = state.sessions.account(descriptor.family()).await;
        networks.push(NetworkSummary::new(descriptor, account));
    }

    Ok(Json(networks))
}

/// Load fresh fee state and return the controller view.
///
/// A failed read is not an error here: the snapshot carries `load_failed`
/// and the previously loaded values.
pub async fn get_network(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
) -> Result<Json<ControllerSnapshot>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "state request")?;
    let controller = state.controller(&network_id)?;

    state.metrics.state_reads.fetch_add(1, Ordering::Relaxed);
    info!("State of {} requested from {}", controller.network(), real_ip);

    let _ = controller.load().await;
    Ok(Json(controller.snapshot().await))
}
