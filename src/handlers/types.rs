use serde::{Deserialize, Serialize};

use crate::chains::{FeeKind, WriteReceipt};
use crate::controller::ControllerSnapshot;
use crate::networks::{ChainFamily, NetworkDescriptor, NetworkId};

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub networks: usize,
}

#[derive(Serialize, Deserialize)]
pub struct MetricsResponse {
    pub state_reads: u64,
    pub admin_writes: u64,
    pub admin_errors: u64,
    pub rejected_requests: u64,
    pub health_checks: u64,
}

/// Registry entry with the current wallet connection
#[derive(Serialize, Deserialize)]
pub struct NetworkSummary {
    pub id: NetworkId,
    pub name: String,
    pub family: ChainFamily,
    pub chain_id: String,
    pub symbol: String,
    pub decimals: u32,
    pub fee_contract: Option<String>,
    pub collector_contract: Option<String>,
    pub explorer_url: Option<String>,
    pub connected: bool,
    pub account: Option<String>,
}

impl NetworkSummary {
    pub fn new(descriptor: &NetworkDescriptor, account: Option<String>) -> Self {
        let fee_contract = descriptor.fee_contract().map(str::to_string);
        let explorer_url = fee_contract
            .as_deref()
            .and_then(|contract| descriptor.explorer_address_url(contract));

        Self {
            id: descriptor.id,
            name: descriptor.name.clone(),
            family: descriptor.family(),
            chain_id: descriptor.chain_id.clone(),
            symbol: descriptor.native_currency.symbol.clone(),
            decimals: descriptor.decimals(),
            fee_contract,
            collector_contract: descriptor.collector_contract().map(str::to_string),
            explorer_url,
            connected: account.is_some(),
            account,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct ConnectRequest {
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ConnectResponse {
    pub network: NetworkId,
    pub account: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub network: NetworkId,
    pub connected: bool,
}

#[derive(Deserialize)]
pub struct UpdateFeeRequest {
    pub kind: FeeKind,
    /// Decimal amount of the native currency
    pub fee: String,
}

#[derive(Deserialize)]
pub struct WithdrawRequest {
    pub destination: String,
    /// Defaults to the full collected balance
    #[serde(default)]
    pub amount: Option<String>,
}

/// Result of a write together with the reloaded state
#[derive(Serialize)]
pub struct WriteResponse {
    pub receipt: WriteReceipt,
    pub state: ControllerSnapshot,
}
