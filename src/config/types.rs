use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::chains::near::FeeOrder;
use crate::constants::ton::DEFAULT_API_URL;
use crate::networks::{NetworkDescriptor, NetworkId};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub wallets: WalletsConfig,
    #[serde(default)]
    pub evm: EvmConfig,
    #[serde(default)]
    pub near: NearConfig,
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub ton: TonConfig,
    /// Per-network overrides keyed by network id, e.g. `[networks.ethereum]`
    #[serde(default)]
    pub networks: HashMap<NetworkId, NetworkOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TlsConfig {
    pub enabled: bool,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allowed IP addresses (empty = allow all)
    pub allowed_ips: Vec<String>,
    /// Reverse proxies allowed to set X-Forwarded-For and friends
    pub trusted_proxies: Vec<String>,
    /// Bearer token required on every request when set
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub log_path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: "/var/log/attestation-admin/audit.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Operator key sources per chain family
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WalletsConfig {
    pub evm: Option<WalletKeyConfig>,
    pub near: Option<WalletKeyConfig>,
    pub solana: Option<WalletKeyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletKeyConfig {
    pub backend: String, // "software", "environment", "os_keyring"
    pub path: Option<String>,    // software backend
    pub env_var: Option<String>, // environment backend
    pub key_name: Option<String>, // os_keyring backend
    pub passphrase: Option<String>,
    /// Signer account for NEAR
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvmConfig {
    /// Block confirmations awaited after a write
    pub confirmations: usize,
    /// Seconds before a pending transaction is reported unconfirmed
    pub confirmation_timeout_secs: u64,
}

impl Default for EvmConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            confirmation_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NearConfig {
    /// Position of the create fee in the `get_prices` result
    pub fee_order: FeeOrder,
    /// Argument names `update_costs` expects for the two fees
    pub create_fee_arg: String,
    pub update_fee_arg: String,
    pub gas: u64,
    pub request_timeout_secs: u64,
}

impl Default for NearConfig {
    fn default() -> Self {
        Self {
            fee_order: FeeOrder::default(),
            create_fee_arg: crate::constants::near::CREATE_FEE_ARG.to_string(),
            update_fee_arg: crate::constants::near::UPDATE_FEE_ARG.to_string(),
            gas: crate::constants::near::DEFAULT_GAS,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolanaConfig {
    pub confirmation_attempts: u32,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            confirmation_attempts: 30,
            poll_interval_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TonConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Wallet connected at startup, if any
    pub wallet_address: Option<String>,
    /// Where wallet requests are written for pickup by the operator's wallet bridge
    pub outbox_path: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for TonConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            wallet_address: None,
            outbox_path: None,
            request_timeout_secs: 30,
        }
    }
}

/// Deployment-specific replacement values for a built-in network descriptor
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NetworkOverride {
    pub rpc_url: Option<String>,
    pub block_explorer_url: Option<String>,
    pub module_contract: Option<String>,
    pub portal_contract: Option<String>,
    pub attestation_contract: Option<String>,
}

impl NetworkOverride {
    pub fn apply(&self, descriptor: &mut NetworkDescriptor) {
        if let Some(rpc_url) = &self.rpc_url {
            descriptor.rpc_url = rpc_url.clone();
        }
        if let Some(explorer) = &self.block_explorer_url {
            descriptor.block_explorer_url = Some(explorer.clone());
        }
        if let Some(module) = &self.module_contract {
            descriptor.module_contract = Some(module.clone());
        }
        if let Some(portal) = &self.portal_contract {
            descriptor.portal_contract = Some(portal.clone());
        }
        if let Some(attestation) = &self.attestation_contract {
            descriptor.attestation_contract = Some(attestation.clone());
        }
    }
}
