//! TON adapter: tonapi reads, wallet-signed writes.

pub mod api;
pub mod cell;
pub mod sender;

use async_trait::async_trait;
use base64::Engine;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
use crate::amount::parse_token_amount;
use crate::config::TonConfig;
use crate::constants::ton::*;
use crate::errors::AdminError;
use crate::networks::{ChainFamily, NetworkDescriptor};
use crate::wallet::WalletSessions;
use api::{TonApi, TonApiClient};
use cell::{op_code, CellBuilder};
pub use sender::{OutboxSender, ReturnToCaller, TonSender, TonTransactionRequest};

/// Workchain plus account hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TonAddress {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl fmt::Display for TonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Parse a raw (`0:<hex>`) or user-friendly (48-char base64) address
pub fn parse_address(value: &str) -> Result<TonAddress, AdminError> {
    let value = value.trim();
    let invalid = |reason: &str| AdminError::InvalidAddress(format!("{value}: {reason}"));

    if let Some((workchain, hash)) = value.split_once(':') {
        let workchain: i8 = workchain.parse().map_err(|_| invalid("bad workchain"))?;
        let bytes = hex::decode(hash).map_err(|_| invalid("account hash is not hex"))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| invalid("account hash must be 32 bytes"))?;
        return Ok(TonAddress { workchain, hash });
    }

    if value.len() != 48 {
        return Err(invalid("expected a raw or 48-character address"));
    }
    let normalized = value.replace('-', "+").replace('_', "/");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(normalized)
        .map_err(|_| invalid("not base64"))?;
    if bytes.len() != 36 {
        return Err(invalid("expected 36 address bytes"));
    }
    let checksum = u16::from_be_bytes([bytes[34], bytes[35]]);
    if crc16_xmodem(&bytes[..34]) != checksum {
        return Err(invalid("checksum mismatch"));
    }

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes[2..34]);
    Ok(TonAddress {
        workchain: bytes[1] as i8,
        hash,
    })
}

pub struct TonAdapter {
    descriptor: NetworkDescriptor,
    api: Arc<dyn TonApi>,
    sender: Arc<dyn TonSender>,
    sessions: WalletSessions,
    contract: TonAddress,
}

impl TonAdapter {
    pub fn new(
        descriptor: NetworkDescriptor,
        api: Arc<dyn TonApi>,
        sender: Arc<dyn TonSender>,
        sessions: WalletSessions,
    ) -> Result<Self, AdminError> {
        if descriptor.family() != ChainFamily::Ton {
            return Err(AdminError::UnsupportedNetwork(format!(
                "{} is not a TON network",
                descriptor.id
            )));
        }

        let contract = descriptor
            .attestation_contract
            .as_deref()
            .ok_or_else(|| {
                AdminError::Config(format!("{}: no attestation contract configured", descriptor.id))
            })
            .and_then(|address| {
                parse_address(address)
                    .map_err(|e| AdminError::Config(format!("{}: {e}", descriptor.id)))
            })?;

        Ok(Self {
            descriptor,
            api,
            sender,
            sessions,
            contract,
        })
    }

    /// tonapi reads; requests go to the outbox file when one is configured
    pub fn over_http(
        descriptor: NetworkDescriptor,
        sessions: WalletSessions,
        config: &TonConfig,
    ) -> Result<Self, AdminError> {
        let api = TonApiClient::new(
            &config.api_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let sender: Arc<dyn TonSender> = match &config.outbox_path {
            Some(path) => Arc::new(OutboxSender::new(path)),
            None => Arc::new(ReturnToCaller),
        };
        Self::new(descriptor, Arc::new(api), sender, sessions)
    }

    /// Build `op:uint32 amount:Coins` and hand it to the wallet
    async fn send_op(&self, op_name: &str, amount: u128) -> Result<WriteReceipt, AdminError> {
        let session = self.sessions.ton().await.ok_or_else(|| {
            AdminError::WalletNotConnected(format!("connect a TON wallet to send {op_name}"))
        })?;

        let body = CellBuilder::new()
            .store_uint(op_code(op_name).into(), 32)?
            .store_coins(amount)?;
        let valid_until = chrono::Utc::now().timestamp() + VALIDITY_WINDOW_SECS;
        let request = TonTransactionRequest::single(
            &self.contract.to_string(),
            DEFAULT_GAS,
            &body.to_boc(),
            valid_until,
        );

        self.sender.send(&request).await?;
        info!(
            "📨 {} for {} handed to wallet {}",
            op_name, self.descriptor.id, session.address
        );
        Ok(WriteReceipt::WalletRequest { request })
    }
}

#[async_trait]
impl ChainAdapter for TonAdapter {
    fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    async fn is_connected(&self) -> bool {
        self.sessions.is_connected(ChainFamily::Ton).await
    }

    async fn connect_wallet(&self, account: Option<String>) -> Result<String, AdminError> {
        self.sessions.connect(ChainFamily::Ton, account, false).await
    }

    async fn disconnect_wallet(&self) {
        self.sessions.disconnect(ChainFamily::Ton).await
    }

    async fn get_attestation_data(&self) -> Result<AttestationFeeState, AdminError> {
        let address = self.contract.to_string();
        let (create_fee, update_fee, balance) = tokio::try_join!(
            self.api.run_get_method(&address, GET_CREATE_FEE),
            self.api.run_get_method(&address, GET_UPDATE_FEE),
            self.api.account_balance(&address),
        )?;

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
        let op = match kind {
            FeeKind::Create => OP_CHANGE_CREATE_FEE,
            FeeKind::Update => OP_CHANGE_UPDATE_FEE,
        };
        self.send_op(op, raw).await
    }

    async fn withdraw_balance(
        &self,
        destination: &str,
        amount: &str,
    ) -> Result<WriteReceipt, AdminError> {
        let destination = parse_address(destination)?;
        let raw = parse_token_amount(amount, self.descriptor.decimals())?;

        // The contract pays its owner; the destination is only recorded
        info!("TON withdrawal requested towards {}", destination);
        self.send_op(OP_WITHDRAW_FUNDS, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::{NetworkId, NetworkRegistry};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTonApi {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TonApi for FakeTonApi {
        async fn run_get_method(&self, address: &str, method: &str) -> Result<u128, AdminError> {
            self.calls.lock().unwrap().push(format!("{address} {method}"));
            if self.fail {
                return Err(AdminError::ReadError("tonapi unavailable".to_string()));
            }
            match method {
                GET_CREATE_FEE => Ok(100_000_000),
                GET_UPDATE_FEE => Ok(50_000_000),
                _ => Err(AdminError::ReadError(format!("unknown method {method}"))),
            }
        }

        async fn account_balance(&self, _address: &str) -> Result<u128, AdminError> {
            Ok(12_345_000_000)
        }
    }

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<TonTransactionRequest>>,
    }

    #[async_trait]
    impl TonSender for RecordingSender {
        async fn send(&self, request: &TonTransactionRequest) -> Result<(), AdminError> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn raw_address() -> String {
        format!("0:{}", "ab".repeat(32))
    }

    async fn adapter(api: FakeTonApi, sender: Arc<RecordingSender>, connected: bool) -> TonAdapter {
        let descriptor = NetworkRegistry::builtin().get(NetworkId::Ton).unwrap().clone();
        let sessions = WalletSessions::default();
        if connected {
            sessions.set_ton(raw_address()).await;
        }
        TonAdapter::new(descriptor, Arc::new(api), sender, sessions).unwrap()
    }

    fn body_of(request: &TonTransactionRequest) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(&request.messages[0].payload)
            .unwrap()
    }

    #[test]
    fn test_parse_raw_and_friendly_addresses() {
        let raw = parse_address(&raw_address()).unwrap();
        assert_eq!(raw.workchain, 0);
        assert_eq!(raw.hash, [0xab; 32]);
        assert_eq!(raw.to_string(), raw_address());

        let masterchain = parse_address(&format!("-1:{}", "00".repeat(32))).unwrap();
        assert_eq!(masterchain.workchain, -1);

        // Build a friendly form of the same account
        let mut bytes = vec![0x11, 0x00];
        bytes.extend_from_slice(&[0xab; 32]);
        let crc = crc16_xmodem(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        let friendly = base64::engine::general_purpose::URL_SAFE.encode(&bytes);
        assert_eq!(parse_address(&friendly).unwrap(), raw);

        let mut corrupted = bytes.clone();
        corrupted[35] ^= 0x01;
        let corrupted = base64::engine::general_purpose::URL_SAFE.encode(&corrupted);

        for invalid in ["not-an-address", "0:abcd", "x:abab", corrupted.as_str()] {
            assert!(
                matches!(parse_address(invalid), Err(AdminError::InvalidAddress(_))),
                "{invalid}"
            );
        }
    }

    #[test]
    fn test_crc16_reference() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31c3);
    }

    #[tokio::test]
    async fn test_reads_get_methods_and_balance() {
        let adapter = adapter(FakeTonApi::default(), Arc::default(), false).await;
        let state = adapter.get_attestation_data().await.unwrap();
        assert_eq!(state.create_fee, 100_000_000);
        assert_eq!(state.update_fee, 50_000_000);
        assert_eq!(state.balance, 12_345_000_000);
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let api = FakeTonApi {
            fail: true,
            ..FakeTonApi::default()
        };
        let adapter = adapter(api, Arc::default(), false).await;
        let err = adapter.get_attestation_data().await.unwrap_err();
        assert!(matches!(err, AdminError::ReadError(_)));
    }

    #[tokio::test]
    async fn test_fee_update_builds_wallet_request() {
        let sender = Arc::new(RecordingSender::default());
        let adapter = adapter(FakeTonApi::default(), sender.clone(), true).await;

        let before = chrono::Utc::now().timestamp();
        let receipt = adapter
            .update_attestation_fee("0.2", FeeKind::Update)
            .await
            .unwrap();
        let WriteReceipt::WalletRequest { request } = receipt else {
            panic!("expected a wallet request");
        };

        assert_eq!(sender.sent.lock().unwrap().as_slice(), &[request.clone()]);
        assert_eq!(request.messages[0].amount, "50000000");
        assert_eq!(
            request.messages[0].address,
            crate::constants::contracts::ton::ATTESTATION_CONTRACT
        );
        assert!(request.valid_until >= before + VALIDITY_WINDOW_SECS);
        assert!(request.valid_until <= chrono::Utc::now().timestamp() + VALIDITY_WINDOW_SECS);

        let expected = CellBuilder::new()
            .store_uint(op_code("change_update_attestation_fee").into(), 32)
            .unwrap()
            .store_coins(200_000_000)
            .unwrap()
            .to_boc();
        assert_eq!(body_of(&request), expected);
    }

    #[tokio::test]
    async fn test_withdraw_validates_destination_and_sends_op() {
        let sender = Arc::new(RecordingSender::default());
        let adapter = adapter(FakeTonApi::default(), sender.clone(), true).await;

        let err = adapter.withdraw_balance("bogus", "1").await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidAddress(_)));
        assert!(sender.sent.lock().unwrap().is_empty());

        adapter.withdraw_balance(&raw_address(), "1.5").await.unwrap();
        let sent = sender.sent.lock().unwrap();
        let body = body_of(&sent[0]);
        let op = op_code("withdraw_funds").to_be_bytes();
        // BOC header is 11 bytes, then the 2 descriptor bytes
        assert_eq!(body[13..17], op);
    }

    #[tokio::test]
    async fn test_writes_need_a_connected_wallet() {
        let sender = Arc::new(RecordingSender::default());
        let adapter = adapter(FakeTonApi::default(), sender.clone(), false).await;
        assert!(!adapter.is_connected().await);

        let err = adapter
            .update_attestation_fee("1", FeeKind::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::WalletNotConnected(_)));
        assert!(sender.sent.lock().unwrap().is_empty());
    }
}
