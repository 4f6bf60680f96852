//! Solana adapter: Anchor attestation program through the SDK RPC client.

pub mod client;
pub mod program;

use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{v0, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::jsonrpc::into_submission;
use super::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
use crate::amount::{format_token_amount, parse_token_amount};
use crate::config::SolanaConfig;
use crate::errors::AdminError;
use crate::networks::{ChainFamily, NetworkDescriptor};
use crate::wallet::{SolanaSession, WalletSessions};
use client::{SdkRpcClient, SignatureStatus, SolanaRpc};
use program::ProgramState;

pub struct SolanaAdapter {
    descriptor: NetworkDescriptor,
    rpc: Arc<dyn SolanaRpc>,
    sessions: WalletSessions,
    program_id: Pubkey,
    confirmation_attempts: u32,
    poll_interval: Duration,
}

impl SolanaAdapter {
    pub fn new(
        descriptor: NetworkDescriptor,
        rpc: Arc<dyn SolanaRpc>,
        sessions: WalletSessions,
        config: &SolanaConfig,
    ) -> Result<Self, AdminError> {
        if descriptor.family() != ChainFamily::Solana {
            return Err(AdminError::UnsupportedNetwork(format!(
                "{} is not a Solana network",
                descriptor.id
            )));
        }

        let program_id = descriptor.attestation_contract.as_deref().ok_or_else(|| {
            AdminError::Config(format!("{}: no attestation program configured", descriptor.id))
        })?;
        let program_id = program::parse_pubkey(program_id)
            .map_err(|e| AdminError::Config(format!("{}: attestation program: {e}", descriptor.id)))?;

        Ok(Self {
            descriptor,
            rpc,
            sessions,
            program_id,
            confirmation_attempts: config.confirmation_attempts,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    pub fn over_http(
        descriptor: NetworkDescriptor,
        sessions: WalletSessions,
        config: &SolanaConfig,
    ) -> Result<Self, AdminError> {
        let rpc = SdkRpcClient::new(
            &descriptor.rpc_url,
            Duration::from_secs(config.request_timeout_secs),
        );
        Self::new(descriptor, Arc::new(rpc), sessions, config)
    }

    async fn read_state(&self) -> Result<ProgramState, AdminError> {
        let state_address = program::state_address(&self.program_id);
        let data = self.rpc.account_data(&state_address).await?.ok_or_else(|| {
            AdminError::ReadError(format!("program state account {state_address} not found"))
        })?;
        ProgramState::decode(&data)
    }

    async fn read_fee_balance(&self, state: &ProgramState) -> Result<u64, AdminError> {
        let fee_account = program::fee_token_account(&state.authority());
        match self.rpc.account_data(&fee_account).await? {
            Some(data) => program::token_account_amount(&data),
            None => Ok(0),
        }
    }

    async fn session(&self, action: &str) -> Result<Arc<SolanaSession>, AdminError> {
        self.sessions.solana().await.ok_or_else(|| {
            AdminError::WalletNotConnected(format!("connect a Solana wallet to {action}"))
        })
    }

    fn keypair(session: &SolanaSession) -> Result<Keypair, AdminError> {
        Keypair::try_from(session.signing_key.to_keypair_bytes().as_slice())
            .map_err(|e| AdminError::Internal(format!("Solana keypair: {e}")))
    }

    /// Build, sign and send `instructions` as a v0 transaction, then poll until confirmed
    async fn send_and_confirm(
        &self,
        keypair: &Keypair,
        instructions: &[Instruction],
        action: &str,
    ) -> Result<WriteReceipt, AdminError> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let message = v0::Message::try_compile(&keypair.pubkey(), instructions, &[], blockhash)
            .map_err(|e| AdminError::SubmissionError(format!("compile {action}: {e}")))?;
        let transaction = VersionedTransaction::try_new(VersionedMessage::V0(message), &[keypair])
            .map_err(|e| AdminError::SubmissionError(format!("sign {action}: {e}")))?;

        let signature = self.rpc.send_transaction(&transaction).await?;
        info!("📤 Sent {} on {}: {}", action, self.descriptor.id, signature);

        self.await_confirmation(&signature, action).await?;
        Ok(WriteReceipt::Confirmed {
            tx_hash: signature.to_string(),
        })
    }

    async fn await_confirmation(&self, signature: &Signature, action: &str) -> Result<(), AdminError> {
        for attempt in 1..=self.confirmation_attempts {
            match self.rpc.signature_status(signature).await {
                Ok(SignatureStatus::Confirmed) => {
                    info!("✅ {} confirmed on {}: {}", action, self.descriptor.id, signature);
                    return Ok(());
                }
                Ok(SignatureStatus::Failed(err)) => {
                    warn!("❌ {} failed on {}: {}", action, self.descriptor.id, err);
                    return Err(AdminError::ConfirmationError(format!(
                        "{action} ({signature}) failed: {err}"
                    )));
                }
                Ok(status) => debug!("{} is {:?} (attempt {})", signature, status, attempt),
                Err(e) => debug!("Status poll for {} failed: {}", signature, e),
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(AdminError::ConfirmationError(format!(
            "{action} ({signature}) not confirmed after {} status checks",
            self.confirmation_attempts
        )))
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    async fn is_connected(&self) -> bool {
        self.sessions.is_connected(ChainFamily::Solana).await
    }

    async fn connect_wallet(&self, _account: Option<String>) -> Result<String, AdminError> {
        self.sessions.connect(ChainFamily::Solana, None, false).await
    }

    async fn disconnect_wallet(&self) {
        self.sessions.disconnect(ChainFamily::Solana).await
    }

    async fn get_attestation_data(&self) -> Result<AttestationFeeState, AdminError> {
        let state = self.read_state().await?;
        let balance = self.read_fee_balance(&state).await?;

        Ok(AttestationFeeState {
            create_fee: state.create_attestation_fee.into(),
            update_fee: state.update_attestation_fee.into(),
            balance: balance.into(),
        })
    }

    async fn update_attestation_fee(
        &self,
        fee: &str,
        kind: FeeKind,
    ) -> Result<WriteReceipt, AdminError> {
        let raw = parse_token_amount(fee, self.descriptor.decimals())?;
        let raw = u64::try_from(raw)
            .map_err(|_| AdminError::InvalidAmount(format!("{fee} exceeds the u64 fee range")))?;
        let keypair = Self::keypair(&*self.session("update the attestation fee").await?)?;

        let instruction = program::set_fee_instruction(
            &self.program_id,
            &keypair.pubkey(),
            kind == FeeKind::Create,
            raw,
        );

        self.send_and_confirm(&keypair, &[instruction], &format!("set_{kind}_attestation_fee"))
            .await
    }

    async fn withdraw_balance(
        &self,
        destination: &str,
        amount: &str,
    ) -> Result<WriteReceipt, AdminError> {
        let destination = program::parse_pubkey(destination)?;
        let requested = parse_token_amount(amount, self.descriptor.decimals())?;
        let keypair = Self::keypair(&*self.session("withdraw").await?)?;

        let state = self.read_state().await.map_err(into_submission)?;
        let authority = state.authority();
        let signer = keypair.pubkey();
        if signer != authority {
            return Err(AdminError::SubmissionError(format!(
                "connected wallet {signer} is not the program authority {authority}"
            )));
        }

        // Closing the token account sweeps all of it
        let available = self.read_fee_balance(&state).await.map_err(into_submission)?;
        if requested != u128::from(available) {
            warn!(
                "Withdrawal sweeps the whole fee account: requested {} SOL, sweeping {} SOL",
                format_token_amount(requested, self.descriptor.decimals(), None),
                format_token_amount(available.into(), self.descriptor.decimals(), None)
            );
        }

        let instructions = program::sweep_instructions(&signer, &destination)?;
        self.send_and_confirm(&keypair, &instructions, "withdraw").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::solana::{SET_CREATE_FEE_IX, STATE_ACCOUNT};
    use crate::networks::{NetworkId, NetworkRegistry};
    use ed25519_dalek::SigningKey;
    use solana_sdk::hash::Hash;
    use spl_token_interface::instruction::TokenInstruction;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// In-memory node: fixed accounts, scripted signature statuses
    #[derive(Default)]
    struct FakeSolanaRpc {
        accounts: HashMap<Pubkey, Vec<u8>>,
        statuses: Mutex<VecDeque<SignatureStatus>>,
        status_checks: Mutex<usize>,
        sent: Mutex<Vec<VersionedTransaction>>,
        reject: Option<String>,
    }

    impl FakeSolanaRpc {
        fn with_account(mut self, address: Pubkey, data: Vec<u8>) -> Self {
            self.accounts.insert(address, data);
            self
        }

        fn with_statuses(self, statuses: Vec<SignatureStatus>) -> Self {
            *self.statuses.lock().unwrap() = statuses.into();
            self
        }

        fn rejecting(mut self, reason: &str) -> Self {
            self.reject = Some(reason.to_string());
            self
        }

        fn sent(&self) -> Vec<VersionedTransaction> {
            self.sent.lock().unwrap().clone()
        }

        fn status_checks(&self) -> usize {
            *self.status_checks.lock().unwrap()
        }
    }

    #[async_trait]
    impl SolanaRpc for FakeSolanaRpc {
        async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, AdminError> {
            Ok(self.accounts.get(address).cloned())
        }

        async fn latest_blockhash(&self) -> Result<Hash, AdminError> {
            Ok(Hash::new_from_array([3u8; 32]))
        }

        async fn send_transaction(
            &self,
            transaction: &VersionedTransaction,
        ) -> Result<Signature, AdminError> {
            if let Some(reason) = &self.reject {
                return Err(AdminError::SubmissionError(reason.clone()));
            }
            self.sent.lock().unwrap().push(transaction.clone());
            Ok(transaction.signatures[0])
        }

        async fn signature_status(&self, _signature: &Signature) -> Result<SignatureStatus, AdminError> {
            *self.status_checks.lock().unwrap() += 1;
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(SignatureStatus::Unknown))
        }
    }

    fn authority_key() -> SigningKey {
        SigningKey::from_bytes(&[11u8; 32])
    }

    fn authority() -> Pubkey {
        Pubkey::new_from_array(authority_key().verifying_key().to_bytes())
    }

    fn state_data(authority: &Pubkey, create: u64, update: u64) -> Vec<u8> {
        let mut data = program::discriminator("account", STATE_ACCOUNT).to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.push(255);
        data.extend_from_slice(authority.as_ref());
        data.extend_from_slice(&[0u8; 64]);
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&create.to_le_bytes());
        data.extend_from_slice(&update.to_le_bytes());
        data.extend_from_slice(&0i64.to_le_bytes());
        data
    }

    /// Node holding the program state and, when given, the authority's wSOL balance
    fn node(authority: &Pubkey, balance: Option<u64>) -> FakeSolanaRpc {
        let program_id = program::tests::program_id();
        let rpc = FakeSolanaRpc::default().with_account(
            program::state_address(&program_id),
            state_data(authority, 1_000, 2_000),
        );
        match balance {
            Some(amount) => rpc.with_account(
                program::fee_token_account(authority),
                program::tests::packed_token_account(authority, amount),
            ),
            None => rpc,
        }
    }

    fn adapter(rpc: Arc<FakeSolanaRpc>, attempts: u32) -> SolanaAdapter {
        let descriptor = NetworkRegistry::builtin().get(NetworkId::Solana).unwrap().clone();
        let config = SolanaConfig {
            confirmation_attempts: attempts,
            poll_interval_ms: 0,
            ..SolanaConfig::default()
        };
        SolanaAdapter::new(descriptor, rpc, WalletSessions::default(), &config).unwrap()
    }

    async fn connect(adapter: &SolanaAdapter) {
        adapter.sessions.set_solana(authority_key()).await;
    }

    fn assert_signed_by_authority(tx: &VersionedTransaction) {
        assert_eq!(tx.message.static_account_keys()[0], authority());
        assert!(tx.verify_with_results().into_iter().all(|ok| ok));
        assert_eq!(tx.message.recent_blockhash(), &Hash::new_from_array([3u8; 32]));
    }

    #[tokio::test]
    async fn test_reads_state_and_wrapped_sol_balance() {
        let rpc = Arc::new(node(&authority(), Some(5_000_000_000)));
        let state = adapter(rpc, 3).get_attestation_data().await.unwrap();
        assert_eq!(state.create_fee, 1_000);
        assert_eq!(state.update_fee, 2_000);
        assert_eq!(state.balance, 5_000_000_000);
    }

    #[tokio::test]
    async fn test_missing_fee_account_reads_as_zero() {
        let rpc = Arc::new(node(&authority(), None));
        let state = adapter(rpc, 3).get_attestation_data().await.unwrap();
        assert_eq!(state.balance, 0);
    }

    #[tokio::test]
    async fn test_missing_state_is_read_error() {
        let err = adapter(Arc::new(FakeSolanaRpc::default()), 3)
            .get_attestation_data()
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ReadError(_)));
    }

    #[tokio::test]
    async fn test_update_fee_sends_and_confirms() {
        let rpc = Arc::new(FakeSolanaRpc::default().with_statuses(vec![
            SignatureStatus::Unknown,
            SignatureStatus::Processed,
            SignatureStatus::Confirmed,
        ]));
        let adapter = adapter(rpc.clone(), 5);
        connect(&adapter).await;

        let receipt = adapter
            .update_attestation_fee("0.25", FeeKind::Create)
            .await
            .unwrap();
        assert_eq!(rpc.status_checks(), 3);

        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        let tx = &sent[0];
        assert_eq!(
            receipt,
            WriteReceipt::Confirmed {
                tx_hash: tx.signatures[0].to_string()
            }
        );
        assert_signed_by_authority(tx);
        assert!(matches!(tx.message, VersionedMessage::V0(_)));

        let instructions = tx.message.instructions();
        assert_eq!(instructions.len(), 1);
        let keys = tx.message.static_account_keys();
        assert_eq!(
            keys[instructions[0].program_id_index as usize],
            adapter.program_id
        );
        let mut expected = program::discriminator("global", SET_CREATE_FEE_IX).to_vec();
        expected.extend_from_slice(&250_000_000u64.to_le_bytes());
        assert_eq!(instructions[0].data, expected);
    }

    #[tokio::test]
    async fn test_failed_or_unconfirmed_writes_return_errors() {
        let rpc = Arc::new(FakeSolanaRpc::default().with_statuses(vec![SignatureStatus::Failed(
            "InstructionError(0, Custom(6000))".to_string(),
        )]));
        let adapter_failed = adapter(rpc, 5);
        connect(&adapter_failed).await;
        let err = adapter_failed
            .update_attestation_fee("1", FeeKind::Update)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ConfirmationError(_)));

        let rpc = Arc::new(FakeSolanaRpc::default());
        let adapter_timeout = adapter(rpc.clone(), 3);
        connect(&adapter_timeout).await;
        let err = adapter_timeout
            .update_attestation_fee("1", FeeKind::Update)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::ConfirmationError(_)));
        assert_eq!(rpc.status_checks(), 3);

        let rpc = Arc::new(FakeSolanaRpc::default().rejecting("Blockhash not found"));
        let adapter_rejected = adapter(rpc.clone(), 3);
        connect(&adapter_rejected).await;
        let err = adapter_rejected
            .update_attestation_fee("1", FeeKind::Update)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::SubmissionError(_)));
        assert_eq!(rpc.status_checks(), 0);
    }

    #[tokio::test]
    async fn test_withdraw_closes_and_recreates_fee_account() {
        let rpc = Arc::new(
            node(&authority(), Some(2_000_000_000))
                .with_statuses(vec![SignatureStatus::Confirmed]),
        );
        let adapter = adapter(rpc.clone(), 3);
        connect(&adapter).await;

        let destination = Pubkey::new_from_array([42u8; 32]);
        adapter
            .withdraw_balance(&destination.to_string(), "2")
            .await
            .unwrap();

        let sent = rpc.sent();
        let tx = &sent[0];
        assert_signed_by_authority(tx);

        let keys = tx.message.static_account_keys();
        let instructions = tx.message.instructions();
        assert_eq!(instructions.len(), 2);

        let close = &instructions[0];
        assert_eq!(keys[close.program_id_index as usize], spl_token_interface::ID);
        assert!(matches!(
            TokenInstruction::unpack(&close.data),
            Ok(TokenInstruction::CloseAccount)
        ));
        assert_eq!(
            keys[close.accounts[0] as usize],
            program::fee_token_account(&authority())
        );
        assert_eq!(keys[close.accounts[1] as usize], destination);

        let recreate = &instructions[1];
        assert_eq!(
            keys[recreate.program_id_index as usize],
            spl_associated_token_account::ID
        );
        assert_eq!(
            keys[recreate.accounts[1] as usize],
            program::fee_token_account(&authority())
        );
    }

    #[tokio::test]
    async fn test_withdraw_requires_authority_and_valid_destination() {
        let rpc = Arc::new(node(&Pubkey::new_from_array([1u8; 32]), Some(1)));
        let adapter = adapter(rpc.clone(), 3);

        let err = adapter
            .withdraw_balance("not-base58-0OIl", "1")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::InvalidAddress(_)));

        let destination = Pubkey::new_from_array([42u8; 32]).to_string();
        let err = adapter.withdraw_balance(&destination, "1").await.unwrap_err();
        assert!(matches!(err, AdminError::WalletNotConnected(_)));

        connect(&adapter).await;
        let err = adapter.withdraw_balance(&destination, "1").await.unwrap_err();
        assert!(matches!(err, AdminError::SubmissionError(_)));
        assert!(rpc.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fee_beyond_u64_is_invalid() {
        let adapter = adapter(Arc::new(FakeSolanaRpc::default()), 3);
        connect(&adapter).await;
        let err = adapter
            .update_attestation_fee("20000000000", FeeKind::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::InvalidAmount(_)));
    }
}
