use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::controller::AdminController;
use crate::errors::AdminError;
use crate::facade::{AdapterSource, NetworkFacade};
use crate::networks::{NetworkId, NetworkRegistry};
use crate::security::SecurityValidator;
use crate::wallet::WalletSessions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<NetworkRegistry>,
    pub sessions: WalletSessions,
    pub controllers: Arc<HashMap<NetworkId, Arc<AdminController>>>,
    pub metrics: Arc<Metrics>,
    pub security: SecurityValidator,
    pub audit_logger: Option<Arc<AuditLogger>>,
}

/// Basic metrics for monitoring
#[derive(Default)]
pub struct Metrics {
    pub state_reads: AtomicU64,
    pub admin_writes: AtomicU64,
    pub admin_errors: AtomicU64,
    pub rejected_requests: AtomicU64,
    pub health_checks: AtomicU64,
}

impl AppState {
    /// Wire the registry, wallet sessions and facade from configuration
    pub fn new(config: Config) -> Result<Self, AdminError> {
        let config = Arc::new(config);
        let registry = Arc::new(config.registry()?);
        let sessions = WalletSessions::new(
            config.wallets.clone(),
            config.ton.wallet_address.clone(),
        );
        let facade = NetworkFacade::new(registry.clone(), sessions.clone(), config.clone());

        Self::with_source(config, registry, sessions, Arc::new(facade))
    }

    /// Build state over any adapter source
    pub fn with_source(
        config: Arc<Config>,
        registry: Arc<NetworkRegistry>,
        sessions: WalletSessions,
        source: Arc<dyn AdapterSource>,
    ) -> Result<Self, AdminError> {
        let controllers = registry
            .all()
            .iter()
            .map(|descriptor| {
                let controller = AdminController::new(descriptor.clone(), source.clone());
                (descriptor.id, Arc::new(controller))
            })
            .collect();

        let security = SecurityValidator::new(
            config.security.allowed_ips.clone(),
            config.security.api_token.clone(),
        )?
        .with_trusted_proxies(config.security.trusted_proxies.clone())?;

        let audit_logger = if config.audit.enabled {
            Some(Arc::new(AuditLogger::new(&config.audit.log_path)?))
        } else {
            None
        };

        Ok(Self {
            config,
            registry,
            sessions,
            controllers: Arc::new(controllers),
            metrics: Arc::new(Metrics::default()),
            security,
            audit_logger,
        })
    }

    /// Controller for a network id as it appears in a URL or CLI argument
    pub fn controller(&self, network_id: &str) -> Result<Arc<AdminController>, AdminError> {
        let descriptor = self.registry.lookup(network_id)?;
        self.controllers
            .get(&descriptor.id)
            .cloned()
            .ok_or_else(|| AdminError::UnsupportedNetwork(network_id.to_string()))
    }
}
