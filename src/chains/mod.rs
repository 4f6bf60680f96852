//! Chain adapters: one implementation of [`ChainAdapter`] per chain family.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AdminError;
use crate::networks::NetworkDescriptor;

pub mod evm;
pub mod jsonrpc;
pub mod near;
pub mod solana;
pub mod ton;

pub use evm::EvmAdapter;
pub use near::NearAdapter;
pub use solana::SolanaAdapter;
pub use ton::TonAdapter;

/// Which attestation fee a write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    Create,
    Update,
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeKind::Create => f.write_str("create"),
            FeeKind::Update => f.write_str("update"),
        }
    }
}

/// Fee parameters and collected balance, in the chain's smallest unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttestationFeeState {
    #[serde(with = "u128_string")]
    pub create_fee: u128,
    #[serde(with = "u128_string")]
    pub update_fee: u128,
    #[serde(with = "u128_string")]
    pub balance: u128,
}

impl AttestationFeeState {
    pub fn fee(&self, kind: FeeKind) -> u128 {
        match kind {
            FeeKind::Create => self.create_fee,
            FeeKind::Update => self.update_fee,
        }
    }
}

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteReceipt {
    /// Included on chain and executed successfully
    Confirmed { tx_hash: String },
    /// Accepted by the RPC node; finality not awaited
    Broadcast { tx_hash: String },
    /// Handed to an external wallet for signing
    WalletRequest { request: ton::TonTransactionRequest },
}

impl WriteReceipt {
    /// Transaction reference for logs and audit entries
    pub fn reference(&self) -> String {
        match self {
            WriteReceipt::Confirmed { tx_hash } | WriteReceipt::Broadcast { tx_hash } => {
                tx_hash.clone()
            }
            WriteReceipt::WalletRequest { request } => request.deeplink.clone(),
        }
    }
}

/// Uniform admin operations over one network
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Descriptor the adapter is bound to
    fn descriptor(&self) -> &NetworkDescriptor;

    /// Whether a wallet session is attached for this network's chain family
    async fn is_connected(&self) -> bool;

    /// Attach a wallet session; `account` names the account for wallets that need one
    async fn connect_wallet(&self, account: Option<String>) -> Result<String, AdminError>;

    /// Drop the wallet session of this network's chain family
    async fn disconnect_wallet(&self);

    /// Read both fees and the collected balance
    async fn get_attestation_data(&self) -> Result<AttestationFeeState, AdminError>;

    /// Set one fee from a decimal string in native currency units
    async fn update_attestation_fee(
        &self,
        fee: &str,
        kind: FeeKind,
    ) -> Result<WriteReceipt, AdminError>;

    /// Withdraw a decimal amount of collected fees to `destination`
    async fn withdraw_balance(
        &self,
        destination: &str,
        amount: &str,
    ) -> Result<WriteReceipt, AdminError>;
}

/// Serialize `u128` amounts as decimal strings so JSON clients keep full precision
pub mod u128_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
