use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AdminError;

/// Closed set of networks the console can administer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkId {
    BscTestnet,
    Base,
    Bsc,
    Linea,
    Arbitrum,
    Ethereum,
    Near,
    Solana,
    Ton,
}

impl NetworkId {
    pub const ALL: [NetworkId; 9] = [
        NetworkId::BscTestnet,
        NetworkId::Base,
        NetworkId::Bsc,
        NetworkId::Linea,
        NetworkId::Arbitrum,
        NetworkId::Ethereum,
        NetworkId::Near,
        NetworkId::Solana,
        NetworkId::Ton,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::BscTestnet => "bsc-testnet",
            NetworkId::Base => "base",
            NetworkId::Bsc => "bsc",
            NetworkId::Linea => "linea",
            NetworkId::Arbitrum => "arbitrum",
            NetworkId::Ethereum => "ethereum",
            NetworkId::Near => "near",
            NetworkId::Solana => "solana",
            NetworkId::Ton => "ton",
        }
    }

    /// Chain family encoded in the identifier
    pub fn family(&self) -> ChainFamily {
        match self {
            NetworkId::BscTestnet
            | NetworkId::Base
            | NetworkId::Bsc
            | NetworkId::Linea
            | NetworkId::Arbitrum
            | NetworkId::Ethereum => ChainFamily::Evm,
            NetworkId::Near => ChainFamily::Near,
            NetworkId::Solana => ChainFamily::Solana,
            NetworkId::Ton => ChainFamily::Ton,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AdminError::NotFound(format!("unknown network '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Near,
    Solana,
    Ton,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Near => "near",
            ChainFamily::Solana => "solana",
            ChainFamily::Ton => "ton",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

impl NativeCurrency {
    pub fn new(name: &str, symbol: &str, decimals: u32) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

/// Static per-network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub id: NetworkId,
    pub name: String,
    /// Numeric EVM chain id; absent for non-EVM chains
    pub evm_chain_id: Option<u64>,
    pub chain_id: String,
    pub rpc_url: String,
    pub block_explorer_url: Option<String>,
    pub module_contract: Option<String>,
    pub portal_contract: Option<String>,
    pub attestation_contract: Option<String>,
    pub native_currency: NativeCurrency,
}

impl NetworkDescriptor {
    pub fn family(&self) -> ChainFamily {
        self.id.family()
    }

    /// Contract holding the fee parameters
    pub fn fee_contract(&self) -> Option<&str> {
        self.module_contract
            .as_deref()
            .or(self.attestation_contract.as_deref())
    }

    /// Contract accumulating collected fees
    pub fn collector_contract(&self) -> Option<&str> {
        self.portal_contract
            .as_deref()
            .or(self.attestation_contract.as_deref())
    }

    pub fn decimals(&self) -> u32 {
        self.native_currency.decimals
    }

    pub fn explorer_address_url(&self, address: &str) -> Option<String> {
        self.block_explorer_url
            .as_ref()
            .map(|base| format!("{}/address/{}", base.trim_end_matches('/'), address))
    }

    /// Check the descriptor shape required by its chain family
    pub fn validate(&self) -> Result<(), AdminError> {
        let module_shape = self.module_contract.is_some() && self.portal_contract.is_some();
        let native_shape = self.attestation_contract.is_some();

        match self.family() {
            ChainFamily::Evm => {
                if module_shape == native_shape {
                    return Err(AdminError::Config(format!(
                        "{}: EVM networks need either module + portal contracts or a single attestation contract",
                        self.id
                    )));
                }
                if self.evm_chain_id.is_none() {
                    return Err(AdminError::Config(format!(
                        "{}: EVM networks need a numeric chain id",
                        self.id
                    )));
                }
            }
            ChainFamily::Near | ChainFamily::Solana | ChainFamily::Ton => {
                if !native_shape {
                    return Err(AdminError::Config(format!(
                        "{}: attestation contract is required",
                        self.id
                    )));
                }
            }
        }

        if self.rpc_url.trim().is_empty() {
            return Err(AdminError::Config(format!("{}: RPC URL is empty", self.id)));
        }

        Ok(())
    }
}
