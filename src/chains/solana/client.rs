//! RPC seam for the Solana adapter, backed by the nonblocking SDK client.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::time::Duration;
use tracing::debug;

use crate::constants::solana::SEND_MAX_RETRIES;
use crate::errors::AdminError;

/// Where a sent transaction stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Not yet seen by the node
    Unknown,
    Processed,
    /// Confirmed or finalized
    Confirmed,
    Failed(String),
}

/// The RPC calls the adapter makes, so tests can swap in a fake node
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Account data, `None` when the account does not exist
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, AdminError>;

    async fn latest_blockhash(&self) -> Result<Hash, AdminError>;

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, AdminError>;

    async fn signature_status(&self, signature: &Signature) -> Result<SignatureStatus, AdminError>;
}

pub struct SdkRpcClient {
    client: RpcClient,
}

impl SdkRpcClient {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                url.to_string(),
                timeout,
                CommitmentConfig::confirmed(),
            ),
        }
    }
}

#[async_trait]
impl SolanaRpc for SdkRpcClient {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, AdminError> {
        debug!("getAccountInfo {}", address);
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| AdminError::ReadError(format!("account {address}: {e}")))?;
        Ok(response.value.map(|account| account.data))
    }

    async fn latest_blockhash(&self) -> Result<Hash, AdminError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| AdminError::SubmissionError(format!("latest blockhash: {e}")))
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, AdminError> {
        let config = RpcSendTransactionConfig {
            max_retries: Some(SEND_MAX_RETRIES),
            preflight_commitment: Some(self.client.commitment().commitment),
            ..RpcSendTransactionConfig::default()
        };

        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| AdminError::SubmissionError(e.to_string()))
    }

    async fn signature_status(&self, signature: &Signature) -> Result<SignatureStatus, AdminError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| AdminError::ReadError(format!("status of {signature}: {e}")))?;

        Ok(match response.value.into_iter().next().flatten() {
            None => SignatureStatus::Unknown,
            Some(status) => match &status.err {
                Some(err) => SignatureStatus::Failed(format!("{err:?}")),
                None if status.satisfies_commitment(CommitmentConfig::confirmed()) => {
                    SignatureStatus::Confirmed
                }
                None => SignatureStatus::Processed,
            },
        })
    }
}
