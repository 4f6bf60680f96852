use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::errors::AdminError;
use crate::handlers::{
    connect_wallet, disconnect_wallet, get_metrics, get_network, health_check, list_networks,
    update_fee, withdraw,
};
use crate::middleware::security_headers_middleware;
use crate::utils::TlsManager;

pub mod state;
pub use state::{AppState, Metrics};

#[cfg(test)]
mod tests;

/// HTTP server for the admin API
pub struct Server {
    config: Config,
    app_state: AppState,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, AdminError> {
        let app_state = AppState::new(config.clone())?;
        Ok(Self { config, app_state })
    }

    pub fn state(&self) -> &AppState {
        &self.app_state
    }

    pub async fn serve(self) -> Result<(), AdminError> {
        let app = self.create_router();

        let addr = SocketAddr::new(
            self.config
                .server
                .address
                .parse()
                .map_err(|e| AdminError::Config(format!("Invalid bind address: {e}")))?,
            self.config.server.port,
        );

        info!("🚀 Attestation admin API starting on {}", addr);

        let tls_manager = TlsManager::new(self.config.tls.clone());
        info!("TLS Configuration: {}", tls_manager.get_config_summary());

        tls_manager.serve(app, addr).await
    }

    pub fn create_router(&self) -> Router {
        router(self.app_state.clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/networks", get(list_networks))
        .route("/networks/{id}", get(get_network))
        .route("/networks/{id}/connect", post(connect_wallet))
        .route("/networks/{id}/disconnect", post(disconnect_wallet))
        .route("/networks/{id}/fees", post(update_fee))
        .route("/networks/{id}/withdraw", post(withdraw))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(security_headers_middleware)),
        )
}
