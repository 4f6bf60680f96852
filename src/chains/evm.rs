//! EVM adapter: fee-module/portal contracts or a single attestation contract.

use async_trait::async_trait;
use ethers::abi::parse_abi;
use ethers::contract::BaseContract;
use ethers::prelude::{
    Address, Bytes, Http, LocalWallet, Middleware, Provider, SignerMiddleware, TransactionRequest,
    H256, U256,
};
use ethers::signers::Signer;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
use crate::amount::parse_token_amount;
use crate::config::EvmConfig;
use crate::constants::evm::*;
use crate::errors::AdminError;
use crate::networks::{ChainFamily, NetworkDescriptor};
use crate::wallet::WalletSessions;

/// Receipt fields the adapter inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmReceipt {
    /// `1` success, `0` reverted; absent on pre-Byzantium chains
    pub status: Option<u64>,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentTransaction {
    pub tx_hash: H256,
    /// `None` when the transaction was dropped before inclusion
    pub receipt: Option<EvmReceipt>,
}

/// Minimal EVM RPC surface used by the adapter
#[async_trait]
pub trait EvmClient: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AdminError>;

    async fn balance(&self, address: Address) -> Result<U256, AdminError>;

    /// Sign, broadcast and wait for the receipt
    async fn send(
        &self,
        wallet: &LocalWallet,
        to: Address,
        data: Bytes,
    ) -> Result<SentTransaction, AdminError>;
}

/// ethers HTTP provider client
pub struct HttpEvmClient {
    provider: Provider<Http>,
    chain_id: u64,
    confirmations: usize,
    confirmation_timeout: Duration,
}

impl HttpEvmClient {
    pub fn new(rpc_url: &str, chain_id: u64, config: &EvmConfig) -> Result<Self, AdminError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| AdminError::Config(format!("Invalid RPC URL {rpc_url}: {e}")))?;

        Ok(Self {
            provider,
            chain_id,
            confirmations: config.confirmations,
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        })
    }
}

#[async_trait]
impl EvmClient for HttpEvmClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AdminError> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| AdminError::ReadError(format!("eth_call to {to:?} failed: {e}")))
    }

    async fn balance(&self, address: Address) -> Result<U256, AdminError> {
        self.provider
            .get_balance(address, None)
            .await
            .map_err(|e| AdminError::ReadError(format!("balance of {address:?} failed: {e}")))
    }

    async fn send(
        &self,
        wallet: &LocalWallet,
        to: Address,
        data: Bytes,
    ) -> Result<SentTransaction, AdminError> {
        let wallet = wallet.clone().with_chain_id(self.chain_id);
        let from = wallet.address();
        let client = SignerMiddleware::new(self.provider.clone(), wallet);

        let tx = TransactionRequest::new().from(from).to(to).data(data);
        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| AdminError::SubmissionError(format!("transaction rejected: {e}")))?;
        let tx_hash = *pending;
        info!("📤 Submitted transaction {:?}", tx_hash);

        let receipt = tokio::time::timeout(
            self.confirmation_timeout,
            pending.confirmations(self.confirmations),
        )
        .await
        .map_err(|_| {
            AdminError::ConfirmationError(format!(
                "transaction {tx_hash:?} not confirmed within {}s",
                self.confirmation_timeout.as_secs()
            ))
        })?
        .map_err(|e| {
            AdminError::ConfirmationError(format!("waiting for {tx_hash:?} failed: {e}"))
        })?;

        Ok(SentTransaction {
            tx_hash,
            receipt: receipt.map(|r| EvmReceipt {
                status: r.status.map(|s| s.as_u64()),
                block_number: r.block_number.map(|n| n.as_u64()),
            }),
        })
    }
}

/// Parse a 20-byte hex address with `0x` prefix
pub fn parse_address(value: &str) -> Result<Address, AdminError> {
    let value = value.trim();
    let hex_part = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| AdminError::InvalidAddress(format!("{value}: missing 0x prefix")))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AdminError::InvalidAddress(format!(
            "{value}: expected 40 hex characters"
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| AdminError::InvalidAddress(format!("{value}: {e}")))?;
    Ok(Address::from_slice(&bytes))
}

fn u256_to_u128(value: U256, what: &str) -> Result<u128, AdminError> {
    if value > U256::from(u128::MAX) {
        return Err(AdminError::ReadError(format!("{what} does not fit in 128 bits")));
    }
    Ok(value.as_u128())
}

pub struct EvmAdapter {
    descriptor: NetworkDescriptor,
    client: Arc<dyn EvmClient>,
    sessions: WalletSessions,
    fee_module: BaseContract,
    portal: BaseContract,
}

impl EvmAdapter {
    pub fn new(
        descriptor: NetworkDescriptor,
        client: Arc<dyn EvmClient>,
        sessions: WalletSessions,
    ) -> Result<Self, AdminError> {
        if descriptor.family() != ChainFamily::Evm {
            return Err(AdminError::UnsupportedNetwork(format!(
                "{} is not an EVM network",
                descriptor.id
            )));
        }

        let fee_module = parse_abi(FEE_MODULE_ABI)
            .map_err(|e| AdminError::Internal(format!("fee module ABI: {e}")))?;
        let portal =
            parse_abi(PORTAL_ABI).map_err(|e| AdminError::Internal(format!("portal ABI: {e}")))?;

        Ok(Self {
            descriptor,
            client,
            sessions,
            fee_module: BaseContract::from(fee_module),
            portal: BaseContract::from(portal),
        })
    }

    /// Adapter talking to the descriptor's RPC endpoint
    pub fn over_http(
        descriptor: NetworkDescriptor,
        sessions: WalletSessions,
        config: &EvmConfig,
    ) -> Result<Self, AdminError> {
        let chain_id = descriptor.evm_chain_id.ok_or_else(|| {
            AdminError::Config(format!("{}: missing EVM chain id", descriptor.id))
        })?;
        let client = HttpEvmClient::new(&descriptor.rpc_url, chain_id, config)?;
        Self::new(descriptor, Arc::new(client), sessions)
    }

    fn contract(&self, address: Option<&str>, role: &str) -> Result<Address, AdminError> {
        let address = address.ok_or_else(|| {
            AdminError::Config(format!("{}: no {role} contract configured", self.descriptor.id))
        })?;
        parse_address(address)
            .map_err(|e| AdminError::Config(format!("{}: {role} contract: {e}", self.descriptor.id)))
    }

    fn fee_contract(&self) -> Result<Address, AdminError> {
        self.contract(self.descriptor.fee_contract(), "fee")
    }

    fn collector_contract(&self) -> Result<Address, AdminError> {
        self.contract(self.descriptor.collector_contract(), "collector")
    }

    async fn read_fee(&self, contract: Address, getter: &str) -> Result<u128, AdminError> {
        let data = self
            .fee_module
            .encode(getter, ())
            .map_err(|e| AdminError::Internal(format!("encode {getter}: {e}")))?;
        let output = self.client.call(contract, data).await?;
        let value: U256 = self
            .fee_module
            .decode_output(getter, output)
            .map_err(|e| AdminError::ReadError(format!("{getter} returned malformed data: {e}")))?;
        u256_to_u128(value, getter)
    }

    async fn submit(&self, to: Address, data: Bytes, action: &str) -> Result<WriteReceipt, AdminError> {
        let session = self.sessions.evm().await.ok_or_else(|| {
            AdminError::WalletNotConnected(format!("connect an EVM wallet to {action}"))
        })?;

        let sent = self.client.send(&session.wallet, to, data).await?;
        let tx_hash = format!("{:?}", sent.tx_hash);

        match sent.receipt {
            None => Err(AdminError::ConfirmationError(format!(
                "{action}: no receipt for {tx_hash}"
            ))),
            Some(EvmReceipt { status: Some(0), .. }) => {
                warn!("❌ {} reverted on {}: {}", action, self.descriptor.id, tx_hash);
                Err(AdminError::ConfirmationError(format!(
                    "{action}: transaction {tx_hash} reverted"
                )))
            }
            Some(receipt) => {
                info!(
                    "✅ {} confirmed on {} in block {:?}: {}",
                    action, self.descriptor.id, receipt.block_number, tx_hash
                );
                Ok(WriteReceipt::Confirmed { tx_hash })
            }
        }
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    async fn is_connected(&self) -> bool {
        self.sessions.is_connected(ChainFamily::Evm).await
    }

    async fn connect_wallet(&self, _account: Option<String>) -> Result<String, AdminError> {
        self.sessions.connect(ChainFamily::Evm, None, false).await
    }

    async fn disconnect_wallet(&self) {
        self.sessions.disconnect(ChainFamily::Evm).await
    }

    async fn get_attestation_data(&self) -> Result<AttestationFeeState, AdminError> {
        let fee_contract = self.fee_contract()?;
        let collector = self.collector_contract()?;

        let (create_fee, update_fee, balance) = tokio::try_join!(
            self.read_fee(fee_contract, CREATE_FEE_GETTER),
            self.read_fee(fee_contract, UPDATE_FEE_GETTER),
            self.client.balance(collector),
        )?;

        Ok(AttestationFeeState {
            create_fee,
            update_fee,
            balance: u256_to_u128(balance, "balance")?,
        })
    }

    async fn update_attestation_fee(
        &self,
        fee: &str,
        kind: FeeKind,
    ) -> Result<WriteReceipt, AdminError> {
        let raw = parse_token_amount(fee, self.descriptor.decimals())?;
        let setter = match kind {
            FeeKind::Create => CREATE_FEE_SETTER,
            FeeKind::Update => UPDATE_FEE_SETTER,
        };

        let data = self
            .fee_module
            .encode(setter, U256::from(raw))
            .map_err(|e| AdminError::Internal(format!("encode {setter}: {e}")))?;

        self.submit(self.fee_contract()?, data, setter).await
    }

    async fn withdraw_balance(
        &self,
        destination: &str,
        amount: &str,
    ) -> Result<WriteReceipt, AdminError> {
        let to = parse_address(destination)?;
        if to.is_zero() {
            return Err(AdminError::InvalidAddress(
                "refusing to withdraw to the zero address".to_string(),
            ));
        }
        let raw = parse_token_amount(amount, self.descriptor.decimals())?;

        let data = self
            .portal
            .encode(WITHDRAW, (to, U256::from(raw)))
            .map_err(|e| AdminError::Internal(format!("encode {WITHDRAW}: {e}")))?;

        self.submit(self.collector_contract()?, data, WITHDRAW).await
    }
}
