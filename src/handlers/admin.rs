use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::Json,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use tracing::{error, info};

use super::types::{
    ConnectRequest, ConnectResponse, DisconnectResponse, UpdateFeeRequest, WithdrawRequest,
    WriteResponse,
};
use super::{authorize, ApiError};
use crate::chains::WriteReceipt;
use crate::controller::AdminController;
use crate::errors::AdminError;
use crate::server::state::AppState;
use crate::services::AdminService;

/// Attach the operator wallet for the network's chain family
pub async fn connect_wallet(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
    request: Option<Json<ConnectRequest>>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "wallet connection")?;
    let controller = state.controller(&network_id)?;
    let Json(request) = request.unwrap_or_default();

    info!("Wallet connection for {} requested from {}", controller.network(), real_ip);
    let account = controller.connect(request.account).await?;

    Ok(Json(ConnectResponse {
        network: controller.network(),
        account,
    }))
}

/// Drop the operator wallet of the network's chain family
pub async fn disconnect_wallet(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
) -> Result<Json<DisconnectResponse>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "wallet disconnection")?;
    let controller = state.controller(&network_id)?;

    info!("Wallet disconnection for {} requested from {}", controller.network(), real_ip);
    controller.disconnect().await?;

    Ok(Json(DisconnectResponse {
        network: controller.network(),
        connected: false,
    }))
}

/// Update the create or update fee
pub async fn update_fee(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
    Json(request): Json<UpdateFeeRequest>,
) -> Result<Json<WriteResponse>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "fee update")?;
    let controller = state.controller(&network_id)?;
    state.metrics.admin_writes.fetch_add(1, Ordering::Relaxed);

    let result = AdminService::update_fee(
        &controller,
        state.audit_logger.as_ref(),
        request.kind,
        &request.fee,
        &real_ip.to_string(),
    )
    .await;

    respond(&state, &controller, result).await
}

/// Withdraw collected fees
pub async fn withdraw(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<WriteResponse>, ApiError> {
    let real_ip = authorize(&state, &headers, &addr, "withdrawal")?;
    let controller = state.controller(&network_id)?;
    state.metrics.admin_writes.fetch_add(1, Ordering::Relaxed);

    let result = AdminService::withdraw(
        &controller,
        state.audit_logger.as_ref(),
        &request.destination,
        request.amount.as_deref(),
        &real_ip.to_string(),
    )
    .await;

    respond(&state, &controller, result).await
}

async fn respond(
    state: &AppState,
    controller: &AdminController,
    result: Result<WriteReceipt, AdminError>,
) -> Result<Json<WriteResponse>, ApiError> {
    match result {
        Ok(receipt) => Ok(Json(WriteResponse {
            receipt,
            state: controller.snapshot().await,
        })),
        Err(e) => {
            state.metrics.admin_errors.fetch_add(1, Ordering::Relaxed);
            error!("Admin write on {} failed: {}", controller.network(), e);
            Err(ApiError(e))
        }
    }
}
