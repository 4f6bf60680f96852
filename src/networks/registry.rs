use std::collections::HashMap;
use tracing::info;

use super::descriptor::{NativeCurrency, NetworkDescriptor, NetworkId};
use crate::config::NetworkOverride;
use crate::constants::contracts;
use crate::errors::AdminError;

/// Immutable lookup table of network descriptors
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    descriptors: Vec<NetworkDescriptor>,
}

impl NetworkRegistry {
    /// Built-in table of supported networks
    pub fn builtin() -> Self {
        let eth = || NativeCurrency::new("Ether", "ETH", 18);
        let bnb = || NativeCurrency::new("BNB", "BNB", 18);

        let module_network = |id: NetworkId,
                              name: &str,
                              evm_chain_id: u64,
                              rpc_url: &str,
                              explorer: &str,
                              module: &str,
                              portal: &str,
                              currency: NativeCurrency| NetworkDescriptor {
            id,
            name: name.to_string(),
            evm_chain_id: Some(evm_chain_id),
            chain_id: format!("{evm_chain_id:#x}"),
            rpc_url: rpc_url.to_string(),
            block_explorer_url: Some(explorer.to_string()),
            module_contract: Some(module.to_string()),
            portal_contract: Some(portal.to_string()),
            attestation_contract: None,
            native_currency: currency,
        };

        let native_network = |id: NetworkId,
                              name: &str,
                              evm_chain_id: Option<u64>,
                              chain_id: &str,
                              rpc_url: &str,
                              explorer: &str,
                              attestation: &str,
                              currency: NativeCurrency| NetworkDescriptor {
            id,
            name: name.to_string(),
            evm_chain_id,
            chain_id: chain_id.to_string(),
            rpc_url: rpc_url.to_string(),
            block_explorer_url: Some(explorer.to_string()),
            module_contract: None,
            portal_contract: None,
            attestation_contract: Some(attestation.to_string()),
            native_currency: currency,
        };

        let descriptors = vec![
            module_network(
                NetworkId::BscTestnet,
                "BSC Testnet",
                97,
                "https://data-seed-prebsc-1-s1.binance.org:8545",
                "https://testnet.bscscan.com",
                contracts::bsc_testnet::MODULE_CONTRACT,
                contracts::bsc_testnet::PORTAL_CONTRACT,
                NativeCurrency::new("BNB", "tBNB", 18),
            ),
            module_network(
                NetworkId::Base,
                "Base Mainnet",
                8453,
                "https://mainnet.base.org",
                "https://basescan.org",
                contracts::base::MODULE_CONTRACT,
                contracts::base::PORTAL_CONTRACT,
                eth(),
            ),
            module_network(
                NetworkId::Bsc,
                "BSC Mainnet",
                56,
                "https://bsc-dataseed.binance.org",
                "https://bscscan.com",
                contracts::bsc::MODULE_CONTRACT,
                contracts::bsc::PORTAL_CONTRACT,
                bnb(),
            ),
            module_network(
                NetworkId::Linea,
                "Linea Mainnet",
                59144,
                "https://rpc.linea.build",
                "https://lineascan.build",
                contracts::linea::MODULE_CONTRACT,
                contracts::linea::PORTAL_CONTRACT,
                NativeCurrency::new("Linea Ether", "ETH", 18),
            ),
            module_network(
                NetworkId::Arbitrum,
                "Arbitrum Mainnet",
                42161,
                "https://arb1.arbitrum.io/rpc",
                "https://arbiscan.io",
                contracts::arbitrum::MODULE_CONTRACT,
                contracts::arbitrum::PORTAL_CONTRACT,
                eth(),
            ),
            native_network(
                NetworkId::Ethereum,
                "Ethereum Mainnet",
                Some(1),
                "0x1",
                "https://eth.llamarpc.com",
                "https://etherscan.io",
                contracts::ethereum::ATTESTATION_CONTRACT,
                eth(),
            ),
            native_network(
                NetworkId::Near,
                "NEAR Mainnet",
                None,
                "mainnet",
                "https://rpc.mainnet.near.org",
                "https://nearblocks.io",
                contracts::near::ATTESTATION_CONTRACT,
                NativeCurrency::new("NEAR", "NEAR", 24),
            ),
            native_network(
                NetworkId::Solana,
                "Solana Mainnet",
                None,
                "mainnet-beta",
                "https://api.mainnet-beta.solana.com",
                "https://solscan.io",
                contracts::solana::ATTESTATION_PROGRAM,
                NativeCurrency::new("Solana", "SOL", 9),
            ),
            native_network(
                NetworkId::Ton,
                "TON Mainnet",
                None,
                "-239",
                "https://tonapi.io",
                "https://tonviewer.com",
                contracts::ton::ATTESTATION_CONTRACT,
                NativeCurrency::new("Toncoin", "TON", 9),
            ),
        ];

        Self { descriptors }
    }

    /// Apply per-deployment overrides and re-check every descriptor
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<NetworkId, NetworkOverride>,
    ) -> Result<Self, AdminError> {
        for descriptor in self.descriptors.iter_mut() {
            if let Some(o) = overrides.get(&descriptor.id) {
                info!("Applying configuration overrides for network {}", descriptor.id);
                o.apply(descriptor);
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Every identifier must have exactly one well-formed descriptor
    pub fn validate(&self) -> Result<(), AdminError> {
        for id in NetworkId::ALL {
            let count = self.descriptors.iter().filter(|d| d.id == id).count();
            if count != 1 {
                return Err(AdminError::Config(format!(
                    "network {id} must have exactly one descriptor, found {count}"
                )));
            }
        }
        self.descriptors.iter().try_for_each(|d| d.validate())
    }

    /// Look up a descriptor by its identifier string
    pub fn lookup(&self, id: &str) -> Result<&NetworkDescriptor, AdminError> {
        let id: NetworkId = id.parse()?;
        self.get(id)
    }

    pub fn get(&self, id: NetworkId) -> Result<&NetworkDescriptor, AdminError> {
        self.descriptors
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AdminError::NotFound(format!("no descriptor for network {id}")))
    }

    pub fn all(&self) -> &[NetworkDescriptor] {
        &self.descriptors
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
