//! Process-wide wallet sessions, one slot per chain family.
//!
//! Adapters never own wallet state; they read the current session through a
//! [`WalletSessions`] handle at call time, so connecting or switching an
//! account is visible to every adapter bound afterwards.

use ed25519_dalek::SigningKey;
use ethers::signers::{LocalWallet, Signer};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{WalletKeyConfig, WalletsConfig};
use crate::errors::AdminError;
use crate::keystore::KeyMaterial;
use crate::networks::ChainFamily;

pub struct EvmSession {
    pub wallet: LocalWallet,
}

pub struct NearSession {
    pub account_id: String,
    pub signing_key: SigningKey,
}

pub struct SolanaSession {
    pub signing_key: SigningKey,
}

impl SolanaSession {
    pub fn pubkey(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

/// Externally held TON wallet; requests are handed to it for signing
pub struct TonSession {
    pub address: String,
}

#[derive(Default)]
struct SessionSet {
    evm: Option<Arc<EvmSession>>,
    near: Option<Arc<NearSession>>,
    solana: Option<Arc<SolanaSession>>,
    ton: Option<Arc<TonSession>>,
}

/// Shared handle to the wallet sessions
#[derive(Clone, Default)]
pub struct WalletSessions {
    sessions: Arc<RwLock<SessionSet>>,
    sources: Arc<WalletSources>,
}

#[derive(Default)]
struct WalletSources {
    keys: WalletsConfig,
    ton_address: Option<String>,
}

impl WalletSessions {
    /// Sessions backed by the configured key sources; nothing is connected yet
    pub fn new(keys: WalletsConfig, ton_address: Option<String>) -> Self {
        Self {
            sessions: Arc::default(),
            sources: Arc::new(WalletSources { keys, ton_address }),
        }
    }

    pub async fn is_connected(&self, family: ChainFamily) -> bool {
        let sessions = self.sessions.read().await;
        match family {
            ChainFamily::Evm => sessions.evm.is_some(),
            ChainFamily::Near => sessions.near.is_some(),
            ChainFamily::Solana => sessions.solana.is_some(),
            ChainFamily::Ton => sessions.ton.is_some(),
        }
    }

    /// Connected account for a family, if any
    pub async fn account(&self, family: ChainFamily) -> Option<String> {
        let sessions = self.sessions.read().await;
        match family {
            ChainFamily::Evm => sessions.evm.as_ref().map(|s| format!("{:?}", s.wallet.address())),
            ChainFamily::Near => sessions.near.as_ref().map(|s| s.account_id.clone()),
            ChainFamily::Solana => sessions
                .solana
                .as_ref()
                .map(|s| bs58::encode(s.pubkey()).into_string()),
            ChainFamily::Ton => sessions.ton.as_ref().map(|s| s.address.clone()),
        }
    }

    pub async fn evm(&self) -> Option<Arc<EvmSession>> {
        self.sessions.read().await.evm.clone()
    }

    pub async fn near(&self) -> Option<Arc<NearSession>> {
        self.sessions.read().await.near.clone()
    }

    pub async fn solana(&self) -> Option<Arc<SolanaSession>> {
        self.sessions.read().await.solana.clone()
    }

    pub async fn ton(&self) -> Option<Arc<TonSession>> {
        self.sessions.read().await.ton.clone()
    }

    /// Connect a family's wallet and return the bound account.
    ///
    /// Key-backed families load their operator key from the configured
    /// keystore; `interactive` allows prompting for a keystore passphrase.
    /// TON binds the given address, or the configured one.
    pub async fn connect(
        &self,
        family: ChainFamily,
        account: Option<String>,
        interactive: bool,
    ) -> Result<String, AdminError> {
        match family {
            ChainFamily::Evm => {
                let key = self.load_key(family, &self.sources.keys.evm, interactive).await?;
                self.set_evm(key.evm_wallet()?).await;
            }
            ChainFamily::Near => {
                let source = &self.sources.keys.near;
                let account_id = account
                    .or_else(|| source.as_ref().and_then(|s| s.account_id.clone()))
                    .ok_or_else(|| {
                        AdminError::WalletNotConnected("NEAR account id is required".to_string())
                    })?;
                crate::chains::near::validate_account_id(&account_id)?;

                let key = self.load_key(family, source, interactive).await?;
                self.set_near(account_id, key.ed25519_signing_key()).await;
            }
            ChainFamily::Solana => {
                let key = self
                    .load_key(family, &self.sources.keys.solana, interactive)
                    .await?;
                self.set_solana(key.ed25519_signing_key()).await;
            }
            ChainFamily::Ton => {
                let address = account
                    .or_else(|| self.sources.ton_address.clone())
                    .ok_or_else(|| {
                        AdminError::WalletNotConnected("TON wallet address is required".to_string())
                    })?;
                crate::chains::ton::parse_address(&address)?;
                self.set_ton(address).await;
            }
        }

        let account = self.account(family).await.ok_or_else(|| {
            AdminError::Internal(format!("{family} session missing after connect"))
        })?;
        info!("🔑 Connected {} wallet: {}", family, account);
        Ok(account)
    }

    /// Connect every family that has a configured key source
    pub async fn connect_configured(&self, interactive: bool) {
        let configured = [
            (ChainFamily::Evm, self.sources.keys.evm.is_some()),
            (ChainFamily::Near, self.sources.keys.near.is_some()),
            (ChainFamily::Solana, self.sources.keys.solana.is_some()),
            (ChainFamily::Ton, self.sources.ton_address.is_some()),
        ];

        for (family, present) in configured {
            if !present {
                continue;
            }
            if let Err(e) = self.connect(family, None, interactive).await {
                warn!("⚠️  Could not connect {} wallet: {}", family, e);
            }
        }
    }

    pub async fn disconnect(&self, family: ChainFamily) {
        let mut sessions = self.sessions.write().await;
        match family {
            ChainFamily::Evm => sessions.evm = None,
            ChainFamily::Near => sessions.near = None,
            ChainFamily::Solana => sessions.solana = None,
            ChainFamily::Ton => sessions.ton = None,
        }
        info!("Disconnected {} wallet", family);
    }

    pub async fn set_evm(&self, wallet: LocalWallet) {
        self.sessions.write().await.evm = Some(Arc::new(EvmSession { wallet }));
    }

    pub async fn set_near(&self, account_id: String, signing_key: SigningKey) {
        self.sessions.write().await.near = Some(Arc::new(NearSession {
            account_id,
            signing_key,
        }));
    }

    pub async fn set_solana(&self, signing_key: SigningKey) {
        self.sessions.write().await.solana = Some(Arc::new(SolanaSession { signing_key }));
    }

    pub async fn set_ton(&self, address: String) {
        self.sessions.write().await.ton = Some(Arc::new(TonSession { address }));
    }

    async fn load_key(
        &self,
        family: ChainFamily,
        source: &Option<WalletKeyConfig>,
        interactive: bool,
    ) -> Result<KeyMaterial, AdminError> {
        let source = source.as_ref().ok_or_else(|| {
            AdminError::WalletNotConnected(format!("no {family} wallet key is configured"))
        })?;

        let passphrase = source.keystore_passphrase(interactive)?;
        let mut keystore = source.create_keystore()?;
        keystore
            .init(passphrase.as_deref())
            .await
            .map_err(|e| AdminError::WalletNotConnected(format!("{family} wallet: {e}")))?;
        keystore
            .key_material()
            .await
            .map_err(|e| AdminError::WalletNotConnected(format!("{family} wallet: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_KEY: &str = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

    fn env_wallet(var: &str, account_id: Option<&str>) -> WalletKeyConfig {
        WalletKeyConfig {
            backend: "environment".to_string(),
            path: None,
            env_var: Some(var.to_string()),
            key_name: None,
            passphrase: None,
            account_id: account_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_nothing_connected_by_default() {
        let sessions = WalletSessions::default();
        for family in [
            ChainFamily::Evm,
            ChainFamily::Near,
            ChainFamily::Solana,
            ChainFamily::Ton,
        ] {
            assert!(!sessions.is_connected(family).await);
            assert!(sessions.account(family).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_connect_from_environment_keys() {
        std::env::set_var("TEST_WALLET_EVM_KEY", HEX_KEY);
        std::env::set_var("TEST_WALLET_NEAR_KEY", HEX_KEY);

        let sessions = WalletSessions::new(
            WalletsConfig {
                evm: Some(env_wallet("TEST_WALLET_EVM_KEY", None)),
                near: Some(env_wallet("TEST_WALLET_NEAR_KEY", Some("admin.near"))),
                solana: None,
            },
            None,
        );

        let address = sessions.connect(ChainFamily::Evm, None, false).await.unwrap();
        assert!(address.starts_with("0x"));
        assert!(sessions.is_connected(ChainFamily::Evm).await);

        let account = sessions.connect(ChainFamily::Near, None, false).await.unwrap();
        assert_eq!(account, "admin.near");

        // An explicit account overrides the configured one
        let account = sessions
            .connect(ChainFamily::Near, Some("other.near".to_string()), false)
            .await
            .unwrap();
        assert_eq!(account, "other.near");

        let err = sessions.connect(ChainFamily::Solana, None, false).await.unwrap_err();
        assert!(matches!(err, AdminError::WalletNotConnected(_)));
    }

    #[tokio::test]
    async fn test_ton_connect_validates_address() {
        let sessions = WalletSessions::default();

        let err = sessions.connect(ChainFamily::Ton, None, false).await.unwrap_err();
        assert!(matches!(err, AdminError::WalletNotConnected(_)));

        let err = sessions
            .connect(ChainFamily::Ton, Some("not-an-address".to_string()), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::InvalidAddress(_)));

        let address = format!("0:{}", "ab".repeat(32));
        let account = sessions
            .connect(ChainFamily::Ton, Some(address.clone()), false)
            .await
            .unwrap();
        assert_eq!(account, address);
    }

    #[tokio::test]
    async fn test_disconnect_clears_session() {
        let sessions = WalletSessions::default();
        sessions
            .set_solana(SigningKey::from_bytes(&[3u8; 32]))
            .await;
        assert!(sessions.is_connected(ChainFamily::Solana).await);

        // Clones share the same sessions
        let other = sessions.clone();
        other.disconnect(ChainFamily::Solana).await;
        assert!(!sessions.is_connected(ChainFamily::Solana).await);
    }
}
