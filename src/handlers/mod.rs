pub mod admin;
pub mod error;
pub mod health;
pub mod metrics;
pub mod networks;
pub mod types;

pub use admin::{connect_wallet, disconnect_wallet, update_fee, withdraw};
pub use error::ApiError;
pub use health::health_check;
pub use metrics::get_metrics;
pub use networks::{get_network, list_networks};
pub use types::*;

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::Ordering;
use tracing::warn;

use crate::server::state::AppState;

/// Resolve the client IP and apply the allowlist and bearer-token checks
pub(crate) fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    addr: &SocketAddr,
    what: &str,
) -> Result<IpAddr, ApiError> {
    let real_ip = state.security.client_ip(headers, addr);

    if let Err(e) = state.security.authorize(&real_ip, headers) {
        state.metrics.rejected_requests.fetch_add(1, Ordering::Relaxed);
        warn!("Rejected {} from {}: {}", what, real_ip, e);
        return Err(ApiError(e));
    }

    Ok(real_ip)
}
