//! Admin controller: the load, edit, submit and reload cycle for one network.
//!
//! The controller owns the operator-facing view (formatted fees and balance,
//! loading and failure flags) and the pending-operation flag that keeps two
//! writes from being submitted at once. Connection state is never stored
//! here; it is read from the wallet sessions through the adapter.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::amount::format_token_amount;
use crate::chains::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
use crate::errors::AdminError;
use crate::facade::AdapterSource;
use crate::networks::{NetworkDescriptor, NetworkId};

/// Fractional digits shown for the collected balance
const BALANCE_PRECISION: usize = 3;

/// Write currently in flight, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    #[default]
    None,
    SavingCreateFee,
    SavingUpdateFee,
    ClaimingBalance,
}

impl PendingOperation {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PendingOperation::SavingCreateFee,
            2 => PendingOperation::SavingUpdateFee,
            3 => PendingOperation::ClaimingBalance,
            _ => PendingOperation::None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            PendingOperation::None => 0,
            PendingOperation::SavingCreateFee => 1,
            PendingOperation::SavingUpdateFee => 2,
            PendingOperation::ClaimingBalance => 3,
        }
    }

    fn for_fee(kind: FeeKind) -> Self {
        match kind {
            FeeKind::Create => PendingOperation::SavingCreateFee,
            FeeKind::Update => PendingOperation::SavingUpdateFee,
        }
    }
}

/// Point-in-time view of the controller, as rendered by the console
#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub network: NetworkId,
    pub name: String,
    pub symbol: String,
    pub connected: bool,
    pub is_loading: bool,
    pub pending_operation: PendingOperation,
    pub create_fee: String,
    pub update_fee: String,
    /// Collected balance truncated to three fractional digits
    pub balance: String,
    /// Last successfully read raw state
    pub raw: Option<AttestationFeeState>,
    pub load_failed: bool,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct ViewState {
    last: Option<AttestationFeeState>,
    load_failed: bool,
    last_error: Option<String>,
}

/// Clears the pending slot on every exit path
struct PendingGuard<'a> {
    slot: &'a AtomicU8,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.slot
            .store(PendingOperation::None.as_u8(), Ordering::SeqCst);
    }
}

struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct AdminController {
    descriptor: NetworkDescriptor,
    source: Arc<dyn AdapterSource>,
    is_loading: AtomicBool,
    pending: AtomicU8,
    view: RwLock<ViewState>,
}

impl AdminController {
    pub fn new(descriptor: NetworkDescriptor, source: Arc<dyn AdapterSource>) -> Self {
        Self {
            descriptor,
            source,
            is_loading: AtomicBool::new(false),
            pending: AtomicU8::new(PendingOperation::None.as_u8()),
            view: RwLock::new(ViewState::default()),
        }
    }

    pub fn network(&self) -> NetworkId {
        self.descriptor.id
    }

    pub fn pending_operation(&self) -> PendingOperation {
        PendingOperation::from_u8(self.pending.load(Ordering::SeqCst))
    }

    fn adapter(&self) -> Result<Box<dyn ChainAdapter>, AdminError> {
        self.source.bind(self.descriptor.id.as_str())
    }

    /// Fetch fresh fee state.
    ///
    /// A failed read keeps the previously displayed values and marks the view
    /// as failed; the error is returned for callers that want to report it.
    pub async fn load(&self) -> Result<AttestationFeeState, AdminError> {
        self.is_loading.store(true, Ordering::SeqCst);
        let _loading = LoadingGuard {
            flag: &self.is_loading,
        };

        let result = match self.adapter() {
            Ok(adapter) => adapter.get_attestation_data().await,
            Err(e) => Err(e),
        };

        let mut view = self.view.write().await;
        match result {
            Ok(state) => {
                view.last = Some(state);
                view.load_failed = false;
                view.last_error = None;
                Ok(state)
            }
            Err(e) => {
                warn!("⚠️  Failed to load {} fee state: {}", self.descriptor.id, e);
                view.load_failed = true;
                view.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Attach a wallet session for this network's chain family
    pub async fn connect(&self, account: Option<String>) -> Result<String, AdminError> {
        self.adapter()?.connect_wallet(account).await
    }

    /// Detach the wallet session; refused while a write is in flight
    pub async fn disconnect(&self) -> Result<(), AdminError> {
        let pending = self.pending_operation();
        if pending != PendingOperation::None {
            return Err(AdminError::Busy(format!(
                "{pending:?} is still running on {}",
                self.descriptor.id
            )));
        }
        self.adapter()?.disconnect_wallet().await;
        Ok(())
    }

    /// Submit a new fee and reload
    pub async fn update_fee(&self, kind: FeeKind, fee: &str) -> Result<WriteReceipt, AdminError> {
        let _pending = self.begin(PendingOperation::for_fee(kind))?;
        info!("Updating {} fee on {} to {}", kind, self.descriptor.id, fee);

        let result = match self.adapter() {
            Ok(adapter) => adapter.update_attestation_fee(fee, kind).await,
            Err(e) => Err(e),
        };
        self.finish("fee update", &result);
        let _ = self.load().await;
        result
    }

    /// Withdraw collected fees and reload.
    ///
    /// Without `amount` the full last-read balance is withdrawn, loading the
    /// state first when nothing has been read yet.
    pub async fn withdraw(
        &self,
        destination: &str,
        amount: Option<&str>,
    ) -> Result<WriteReceipt, AdminError> {
        let _pending = self.begin(PendingOperation::ClaimingBalance)?;

        let result = self.submit_withdraw(destination, amount).await;
        self.finish("withdrawal", &result);
        let _ = self.load().await;
        result
    }

    async fn submit_withdraw(
        &self,
        destination: &str,
        amount: Option<&str>,
    ) -> Result<WriteReceipt, AdminError> {
        let amount = match amount {
            Some(amount) => amount.to_string(),
            None => {
                let last = self.view.read().await.last;
                let balance = match last {
                    Some(state) => state.balance,
                    None => self.load().await?.balance,
                };
                format_token_amount(balance, self.descriptor.decimals(), None)
            }
        };

        info!(
            "Withdrawing {} {} from {} to {}",
            amount, self.descriptor.native_currency.symbol, self.descriptor.id, destination
        );
        self.adapter()?.withdraw_balance(destination, &amount).await
    }

    fn begin(&self, operation: PendingOperation) -> Result<PendingGuard<'_>, AdminError> {
        self.pending
            .compare_exchange(
                PendingOperation::None.as_u8(),
                operation.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|current| {
                AdminError::Busy(format!(
                    "{:?} is still running on {}",
                    PendingOperation::from_u8(current),
                    self.descriptor.id
                ))
            })?;

        Ok(PendingGuard {
            slot: &self.pending,
        })
    }

    fn finish(&self, what: &str, result: &Result<WriteReceipt, AdminError>) {
        match result {
            Ok(receipt) => info!(
                "✅ {} on {} succeeded: {}",
                what,
                self.descriptor.id,
                receipt.reference()
            ),
            Err(e) => error!("❌ {} on {} failed: {}", what, self.descriptor.id, e),
        }
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let connected = match self.adapter() {
            Ok(adapter) => adapter.is_connected().await,
            Err(_) => false,
        };

        let view = self.view.read().await;
        let decimals = self.descriptor.decimals();
        let (create_fee, update_fee, balance) = match view.last {
            Some(state) => (
                format_token_amount(state.create_fee, decimals, None),
                format_token_amount(state.update_fee, decimals, None),
                format_token_amount(state.balance, decimals, Some(BALANCE_PRECISION)),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        ControllerSnapshot {
            network: self.descriptor.id,
            name: self.descriptor.name.clone(),
            symbol: self.descriptor.native_currency.symbol.clone(),
            connected,
            is_loading: self.is_loading.load(Ordering::SeqCst),
            pending_operation: self.pending_operation(),
            create_fee,
            update_fee,
            balance,
            raw: view.last,
            load_failed: view.load_failed,
            last_error: view.last_error.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory adapter source shared by controller and server tests.

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    use crate::amount::parse_token_amount;
    use crate::chains::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
    use crate::errors::AdminError;
    use crate::facade::AdapterSource;
    use crate::networks::{NetworkDescriptor, NetworkRegistry};

    #[derive(Default)]
    pub struct FakeChain {
        pub state: Mutex<AttestationFeeState>,
        pub connected: AtomicBool,
        pub fail_reads: AtomicBool,
        pub fail_writes: AtomicBool,
        pub reads: Mutex<u32>,
        pub withdrawals: Mutex<Vec<(String, String)>>,
        /// When set, writes wait for a permit
        pub gate: Mutex<Option<Arc<Semaphore>>>,
    }

    pub struct FakeSource {
        pub registry: NetworkRegistry,
        pub chain: Arc<FakeChain>,
    }

    impl FakeSource {
        pub fn new(state: AttestationFeeState) -> Self {
            let chain = FakeChain::default();
            *chain.state.lock().unwrap() = state;
            chain.connected.store(true, Ordering::SeqCst);
            Self {
                registry: NetworkRegistry::builtin(),
                chain: Arc::new(chain),
            }
        }
    }

    impl AdapterSource for FakeSource {
        fn bind(&self, network_id: &str) -> Result<Box<dyn ChainAdapter>, AdminError> {
            let descriptor = self
                .registry
                .lookup(network_id)
                .map_err(|_| AdminError::UnsupportedNetwork(network_id.to_string()))?
                .clone();
            Ok(Box::new(FakeAdapter {
                descriptor,
                chain: self.chain.clone(),
            }))
        }
    }

    struct FakeAdapter {
        descriptor: NetworkDescriptor,
        chain: Arc<FakeChain>,
    }

    impl FakeAdapter {
        async fn write(&self) -> Result<(), AdminError> {
            let gate = self.chain.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| AdminError::Internal(e.to_string()))?;
            }
            if !self.chain.connected.load(Ordering::SeqCst) {
                return Err(AdminError::WalletNotConnected("no wallet".to_string()));
            }
            if self.chain.fail_writes.load(Ordering::SeqCst) {
                return Err(AdminError::SubmissionError("rejected".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ChainAdapter for FakeAdapter {
        fn descriptor(&self) -> &NetworkDescriptor {
            &self.descriptor
        }

        async fn is_connected(&self) -> bool {
            self.chain.connected.load(Ordering::SeqCst)
        }

        async fn connect_wallet(&self, account: Option<String>) -> Result<String, AdminError> {
            self.chain.connected.store(true, Ordering::SeqCst);
            Ok(account.unwrap_or_else(|| "operator".to_string()))
        }

        async fn disconnect_wallet(&self) {
            self.chain.connected.store(false, Ordering::SeqCst);
        }

        async fn get_attestation_data(&self) -> Result<AttestationFeeState, AdminError> {
            *self.chain.reads.lock().unwrap() += 1;
            if self.chain.fail_reads.load(Ordering::SeqCst) {
                return Err(AdminError::ReadError("rpc down".to_string()));
            }
            Ok(*self.chain.state.lock().unwrap())
        }

        async fn update_attestation_fee(
            &self,
            fee: &str,
            kind: FeeKind,
        ) -> Result<WriteReceipt, AdminError> {
            let raw = parse_token_amount(fee, self.descriptor.decimals())?;
            self.write().await?;
            let mut state = self.chain.state.lock().unwrap();
            match kind {
                FeeKind::Create => state.create_fee = raw,
                FeeKind::Update => state.update_fee = raw,
            }
            Ok(WriteReceipt::Confirmed {
                tx_hash: "0xfee".to_string(),
            })
        }

        async fn withdraw_balance(
            &self,
            destination: &str,
            amount: &str,
        ) -> Result<WriteReceipt, AdminError> {
            let raw = parse_token_amount(amount, self.descriptor.decimals())?;
            self.write().await?;
            let mut state = self.chain.state.lock().unwrap();
            state.balance = state.balance.checked_sub(raw).ok_or_else(|| {
                AdminError::SubmissionError("insufficient balance".to_string())
            })?;
            self.chain
                .withdrawals
                .lock()
                .unwrap()
                .push((destination.to_string(), amount.to_string()));
            Ok(WriteReceipt::Confirmed {
                tx_hash: "0xwithdraw".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeSource;
    use super::*;
    use tokio::sync::Semaphore;

    fn fee_state() -> AttestationFeeState {
        AttestationFeeState {
            create_fee: 10_000_000_000_000_000,
            update_fee: 5_000_000_000_000_000,
            balance: 1_234_567_890_000_000_000,
        }
    }

    fn controller(network: NetworkId) -> (Arc<AdminController>, Arc<FakeSource>) {
        let source = Arc::new(FakeSource::new(fee_state()));
        let descriptor = source.registry.get(network).unwrap().clone();
        let controller = AdminController::new(descriptor, source.clone());
        (Arc::new(controller), source)
    }

    #[tokio::test]
    async fn test_load_formats_fields() {
        let (controller, _) = controller(NetworkId::Base);
        controller.load().await.unwrap();

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.create_fee, "0.01");
        assert_eq!(snapshot.update_fee, "0.005");
        assert_eq!(snapshot.balance, "1.234");
        assert!(snapshot.connected);
        assert!(!snapshot.is_loading);
        assert!(!snapshot.load_failed);
        assert_eq!(snapshot.pending_operation, PendingOperation::None);
        assert_eq!(snapshot.raw.unwrap().balance, 1_234_567_890_000_000_000);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_values() {
        let (controller, source) = controller(NetworkId::Base);
        controller.load().await.unwrap();

        source.chain.fail_reads.store(true, Ordering::SeqCst);
        let err = controller.load().await.unwrap_err();
        assert!(matches!(err, AdminError::ReadError(_)));

        let snapshot = controller.snapshot().await;
        assert!(snapshot.load_failed);
        assert_eq!(snapshot.create_fee, "0.01");
        assert!(snapshot.last_error.unwrap().contains("rpc down"));

        source.chain.fail_reads.store(false, Ordering::SeqCst);
        controller.load().await.unwrap();
        let snapshot = controller.snapshot().await;
        assert!(!snapshot.load_failed);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn test_first_load_failure_shows_empty_fields() {
        let (controller, source) = controller(NetworkId::Near);
        source.chain.fail_reads.store(true, Ordering::SeqCst);
        assert!(controller.load().await.is_err());

        let snapshot = controller.snapshot().await;
        assert!(snapshot.load_failed);
        assert_eq!(snapshot.create_fee, "");
        assert!(snapshot.raw.is_none());
    }

    #[tokio::test]
    async fn test_update_fee_reloads() {
        let (controller, source) = controller(NetworkId::Base);
        controller.load().await.unwrap();

        let receipt = controller.update_fee(FeeKind::Create, "0.02").await.unwrap();
        assert_eq!(receipt.reference(), "0xfee");
        assert_eq!(*source.chain.reads.lock().unwrap(), 2);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.create_fee, "0.02");
        assert_eq!(snapshot.update_fee, "0.005");
        assert_eq!(snapshot.pending_operation, PendingOperation::None);
    }

    #[tokio::test]
    async fn test_failed_write_clears_pending_and_reloads() {
        let (controller, source) = controller(NetworkId::Base);
        source.chain.fail_writes.store(true, Ordering::SeqCst);

        let err = controller.update_fee(FeeKind::Update, "1").await.unwrap_err();
        assert!(matches!(err, AdminError::SubmissionError(_)));
        assert_eq!(controller.pending_operation(), PendingOperation::None);
        assert_eq!(*source.chain.reads.lock().unwrap(), 1);

        // Bad input is rejected by the adapter and still clears the flag
        let err = controller.update_fee(FeeKind::Update, "abc").await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidAmount(_)));
        assert_eq!(controller.pending_operation(), PendingOperation::None);
    }

    #[tokio::test]
    async fn test_withdraw_defaults_to_full_balance() {
        let (controller, source) = controller(NetworkId::Base);

        // Nothing loaded yet: the controller reads the balance first
        controller.withdraw("0xdest", None).await.unwrap();
        let withdrawals = source.chain.withdrawals.lock().unwrap().clone();
        assert_eq!(withdrawals, vec![("0xdest".to_string(), "1.23456789".to_string())]);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.balance, "0.000");
    }

    #[tokio::test]
    async fn test_withdraw_explicit_amount() {
        let (controller, source) = controller(NetworkId::Base);
        controller.load().await.unwrap();

        controller.withdraw("0xdest", Some("0.2")).await.unwrap();
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.balance, "1.034");
        assert_eq!(source.chain.withdrawals.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_write_is_busy() {
        let (controller, source) = controller(NetworkId::Base);
        let gate = Arc::new(Semaphore::new(0));
        *source.chain.gate.lock().unwrap() = Some(gate.clone());

        let running = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.update_fee(FeeKind::Create, "0.03").await })
        };

        while controller.pending_operation() == PendingOperation::None {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            controller.snapshot().await.pending_operation,
            PendingOperation::SavingCreateFee
        );

        let err = controller.withdraw("0xdest", Some("0.1")).await.unwrap_err();
        assert!(matches!(err, AdminError::Busy(_)));
        let err = controller.update_fee(FeeKind::Update, "0.1").await.unwrap_err();
        assert!(matches!(err, AdminError::Busy(_)));
        let err = controller.disconnect().await.unwrap_err();
        assert!(matches!(err, AdminError::Busy(_)));
        assert!(source.chain.connected.load(Ordering::SeqCst));

        gate.add_permits(1);
        running.await.unwrap().unwrap();
        assert_eq!(controller.pending_operation(), PendingOperation::None);
        assert!(source.chain.withdrawals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_is_derived() {
        let (controller, source) = controller(NetworkId::Solana);
        source.chain.connected.store(false, Ordering::SeqCst);
        assert!(!controller.snapshot().await.connected);

        let err = controller.update_fee(FeeKind::Create, "0.1").await.unwrap_err();
        assert!(matches!(err, AdminError::WalletNotConnected(_)));

        controller.connect(None).await.unwrap();
        assert!(controller.snapshot().await.connected);

        controller.disconnect().await.unwrap();
        assert!(!controller.snapshot().await.connected);
        let err = controller.withdraw("0xdest", Some("0.1")).await.unwrap_err();
        assert!(matches!(err, AdminError::WalletNotConnected(_)));
    }

    #[test]
    fn test_pending_operation_serialization() {
        assert_eq!(
            serde_json::to_string(&PendingOperation::ClaimingBalance).unwrap(),
            "\"claiming_balance\""
        );
        assert_eq!(
            serde_json::to_string(&PendingOperation::None).unwrap(),
            "\"none\""
        );
    }
}
