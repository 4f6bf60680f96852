//! Network facade: binds a network identifier to its chain adapter.

use std::sync::Arc;
use tracing::debug;

use crate::chains::{ChainAdapter, EvmAdapter, NearAdapter, SolanaAdapter, TonAdapter};
use crate::config::Config;
use crate::errors::AdminError;
use crate::networks::{ChainFamily, NetworkRegistry};
use crate::wallet::WalletSessions;

/// Anything that can hand out an adapter for a network identifier
pub trait AdapterSource: Send + Sync {
    fn bind(&self, network_id: &str) -> Result<Box<dyn ChainAdapter>, AdminError>;
}

/// Builds a fresh adapter per call from the registry and current wallet sessions
#[derive(Clone)]
pub struct NetworkFacade {
    registry: Arc<NetworkRegistry>,
    sessions: WalletSessions,
    config: Arc<Config>,
}

impl NetworkFacade {
    pub fn new(registry: Arc<NetworkRegistry>, sessions: WalletSessions, config: Arc<Config>) -> Self {
        Self {
            registry,
            sessions,
            config,
        }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &WalletSessions {
        &self.sessions
    }
}

impl AdapterSource for NetworkFacade {
    fn bind(&self, network_id: &str) -> Result<Box<dyn ChainAdapter>, AdminError> {
        let descriptor = self
            .registry
            .lookup(network_id)
            .map_err(|_| AdminError::UnsupportedNetwork(format!("unsupported network '{network_id}'")))?
            .clone();
        debug!("Binding {} adapter for {}", descriptor.family(), descriptor.id);

        let sessions = self.sessions.clone();
        let adapter: Box<dyn ChainAdapter> = match descriptor.family() {
            ChainFamily::Evm => Box::new(EvmAdapter::over_http(descriptor, sessions, &self.config.evm)?),
            ChainFamily::Near => {
                Box::new(NearAdapter::over_http(descriptor, sessions, &self.config.near)?)
            }
            ChainFamily::Solana => {
                Box::new(SolanaAdapter::over_http(descriptor, sessions, &self.config.solana)?)
            }
            ChainFamily::Ton => Box::new(TonAdapter::over_http(descriptor, sessions, &self.config.ton)?),
        };
        Ok(adapter)
    }
}
