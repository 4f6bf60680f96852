//! NEAR adapter over JSON-RPC with locally signed function calls.

pub mod transaction;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::jsonrpc::{field, into_submission, HttpRpcTransport, RpcTransport};
use super::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
use crate::amount::parse_token_amount;
use crate::config::NearConfig;
use crate::constants::near::*;
use crate::errors::AdminError;
use crate::networks::{ChainFamily, NetworkDescriptor};
use crate::wallet::{NearSession, WalletSessions};
use transaction::{Action, FunctionCall, PublicKey, Transaction};

/// Which `get_prices` element holds the create fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeeOrder {
    /// `[create, update]`
    #[default]
    CreateFirst,
    /// `[update, create]`
    UpdateFirst,
}

impl FeeOrder {
    /// Map the contract's price pair to `(create, update)`
    pub fn split(self, prices: [u128; 2]) -> (u128, u128) {
        match self {
            FeeOrder::CreateFirst => (prices[0], prices[1]),
            FeeOrder::UpdateFirst => (prices[1], prices[0]),
        }
    }
}

/// Validate a NEAR account id (named or implicit)
pub fn validate_account_id(account_id: &str) -> Result<(), AdminError> {
    let invalid = |reason: &str| AdminError::InvalidAddress(format!("{account_id}: {reason}"));

    if account_id.len() < 2 || account_id.len() > 64 {
        return Err(invalid("must be 2 to 64 characters"));
    }

    for part in account_id.split('.') {
        if part.is_empty() {
            return Err(invalid("empty name segment"));
        }
        let mut previous_separator = true;
        for c in part.chars() {
            let separator = c == '-' || c == '_';
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || separator) {
                return Err(invalid("only lowercase letters, digits, '-' and '_' are allowed"));
            }
            if separator && previous_separator {
                return Err(invalid("separators must sit between alphanumerics"));
            }
            previous_separator = separator;
        }
        if previous_separator {
            return Err(invalid("separators must sit between alphanumerics"));
        }
    }

    Ok(())
}

/// Numbers from NEAR contracts arrive as JSON strings or plain numbers
fn json_u128(value: &Value) -> Result<u128, AdminError> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| AdminError::ReadError(format!("expected an integer amount, got {value}")))
}

pub struct NearAdapter {
    descriptor: NetworkDescriptor,
    rpc: Arc<dyn RpcTransport>,
    sessions: WalletSessions,
    fee_order: FeeOrder,
    fee_args: (String, String),
    gas: u64,
}

impl NearAdapter {
    pub fn new(
        descriptor: NetworkDescriptor,
        rpc: Arc<dyn RpcTransport>,
        sessions: WalletSessions,
        config: &NearConfig,
    ) -> Result<Self, AdminError> {
        if descriptor.family() != ChainFamily::Near {
            return Err(AdminError::UnsupportedNetwork(format!(
                "{} is not a NEAR network",
                descriptor.id
            )));
        }

        Ok(Self {
            descriptor,
            rpc,
            sessions,
            fee_order: config.fee_order,
            fee_args: (config.create_fee_arg.clone(), config.update_fee_arg.clone()),
            gas: config.gas,
        })
    }

    pub fn over_http(
        descriptor: NetworkDescriptor,
        sessions: WalletSessions,
        config: &NearConfig,
    ) -> Result<Self, AdminError> {
        let rpc = HttpRpcTransport::new(
            &descriptor.rpc_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Self::new(descriptor, Arc::new(rpc), sessions, config)
    }

    fn contract_id(&self) -> Result<&str, AdminError> {
        self.descriptor.attestation_contract.as_deref().ok_or_else(|| {
            AdminError::Config(format!("{}: no attestation contract configured", self.descriptor.id))
        })
    }

    async fn query(&self, params: Value) -> Result<Value, AdminError> {
        self.rpc.request("query", params).await
    }

    /// `(create, update)` from `get_prices`
    async fn read_prices(&self) -> Result<(u128, u128), AdminError> {
        let result = self
            .query(json!({
                "request_type": "call_function",
                "finality": FINALITY,
                "account_id": self.contract_id()?,
                "method_name": GET_PRICES,
                "args_base64": base64::engine::general_purpose::STANDARD.encode(b"{}"),
            }))
            .await?;

        let raw: Vec<u8> = field(&result, "/result")?;
        let prices: Vec<Value> = serde_json::from_slice(&raw)
            .map_err(|e| AdminError::ReadError(format!("{GET_PRICES} returned invalid JSON: {e}")))?;

        match prices.as_slice() {
            [first, second] => Ok(self.fee_order.split([json_u128(first)?, json_u128(second)?])),
            _ => Err(AdminError::ReadError(format!(
                "{GET_PRICES} returned {} values, expected 2",
                prices.len()
            ))),
        }
    }

    async fn read_balance(&self) -> Result<u128, AdminError> {
        let result = self
            .query(json!({
                "request_type": "view_account",
                "finality": FINALITY,
                "account_id": self.contract_id()?,
            }))
            .await?;
        json_u128(&field::<Value>(&result, "/amount")?)
    }

    async fn session(&self, action: &str) -> Result<Arc<NearSession>, AdminError> {
        self.sessions.near().await.ok_or_else(|| {
            AdminError::WalletNotConnected(format!("connect a NEAR wallet to {action}"))
        })
    }

    /// Sign `method(args)` against the contract and send it, waiting for optimistic execution
    async fn call(
        &self,
        session: &NearSession,
        method: &str,
        args: Value,
    ) -> Result<WriteReceipt, AdminError> {
        let public_key = PublicKey::ed25519(session.signing_key.verifying_key().to_bytes());

        let access_key = self
            .query(json!({
                "request_type": "view_access_key",
                "finality": FINALITY,
                "account_id": session.account_id,
                "public_key": public_key.to_rpc_string(),
            }))
            .await
            .map_err(into_submission)?;
        let nonce: u64 = field(&access_key, "/nonce").map_err(into_submission)?;
        let block_hash: String = field(&access_key, "/block_hash").map_err(into_submission)?;
        let block_hash: [u8; 32] = bs58::decode(&block_hash)
            .into_vec()
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| AdminError::SubmissionError(format!("invalid block hash {block_hash}")))?;

        let transaction = Transaction {
            signer_id: session.account_id.clone(),
            public_key,
            nonce: nonce + 1,
            receiver_id: self.contract_id()?.to_string(),
            block_hash,
            actions: vec![Action::FunctionCall(FunctionCall {
                method_name: method.to_string(),
                args: serde_json::to_vec(&args)?,
                gas: self.gas,
                deposit: 0,
            })],
        };

        let signed = transaction.sign(&session.signing_key)?;
        let tx_hash = signed.hash_string()?;

        let outcome = self
            .rpc
            .request(
                "send_tx",
                json!({
                    "signed_tx_base64": signed.to_base64()?,
                    "wait_until": "EXECUTED_OPTIMISTIC",
                }),
            )
            .await
            .map_err(into_submission)?;

        if let Some(failure) = outcome.pointer("/status/Failure") {
            warn!("❌ {} failed on {}: {}", method, self.descriptor.id, failure);
            return Err(AdminError::ConfirmationError(format!(
                "{method} ({tx_hash}) failed: {failure}"
            )));
        }

        info!("📤 {} executed on {}: {}", method, self.descriptor.id, tx_hash);
        Ok(WriteReceipt::Broadcast { tx_hash })
    }
}

#[async_trait]
impl ChainAdapter for NearAdapter {
    fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    async fn is_connected(&self) -> bool {
        self.sessions.is_connected(ChainFamily::Near).await
    }

    async fn connect_wallet(&self, account: Option<String>) -> Result<String, AdminError> {
        self.sessions.connect(ChainFamily::Near, account, false).await
    }

    async fn disconnect_wallet(&self) {
        self.sessions.disconnect(ChainFamily::Near).await
    }

    async fn get_attestation_data(&self) -> Result<AttestationFeeState, AdminError> {
        let ((create_fee, update_fee), balance) =
            tokio::try_join!(self.read_prices(), self.read_balance())?;

        Ok(AttestationFeeState {
            create_fee,
            update_fee,
            balance,
        })
    }

    async fn update_attestation_fee(
        &self,
        fee: &str,
        kind: FeeKind,
    ) -> Result<WriteReceipt, AdminError> {
        let raw = parse_token_amount(fee, self.descriptor.decimals())?;
        let session = self.session(UPDATE_COSTS).await?;

        // update_costs takes both fees; carry the other one over unchanged
        let (current_create, current_update) = self.read_prices().await?;
        let (create_fee, update_fee) = match kind {
            FeeKind::Create => (raw, current_update),
            FeeKind::Update => (current_create, raw),
        };

        let (create_arg, update_arg) = &self.fee_args;
        let mut args = serde_json::Map::new();
        args.insert(create_arg.clone(), Value::String(create_fee.to_string()));
        args.insert(update_arg.clone(), Value::String(update_fee.to_string()));

        self.call(&session, UPDATE_COSTS, Value::Object(args)).await
    }

    async fn withdraw_balance(
        &self,
        destination: &str,
        amount: &str,
    ) -> Result<WriteReceipt, AdminError> {
        validate_account_id(destination)?;
        let raw = parse_token_amount(amount, self.descriptor.decimals())?;
        let session = self.session(WITHDRAW).await?;

        self.call(
            &session,
            WITHDRAW,
            json!({
                "amount": raw.to_string(),
                "destination": destination,
            }),
        )
        .await
    }
}
