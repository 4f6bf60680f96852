use ethers::signers::LocalWallet;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::AdminError;

const NEAR_KEY_PREFIX: &str = "ed25519:";

/// In-memory key material that gets zeroized on drop
#[derive(ZeroizeOnDrop)]
pub struct KeyMaterial {
    private_key: [u8; 32],
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl KeyMaterial {
    /// Create key material from a 64-character hex string, with or without `0x`
    pub fn from_hex(hex_key: &str) -> Result<Self, AdminError> {
        let hex_key = hex_key.trim();
        let hex_key = hex_key.strip_prefix("0x").unwrap_or(hex_key);

        if hex_key.len() != 64 {
            return Err(AdminError::InvalidKey(
                "Private key must be exactly 64 hex characters (32 bytes)".to_string(),
            ));
        }

        let mut bytes = hex::decode(hex_key)
            .map_err(|e| AdminError::InvalidKey(format!("Invalid private key hex: {e}")))?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Parse any supported encoding: hex, base58 seed, base58 Solana keypair
    /// or a NEAR `ed25519:` secret key
    pub fn from_encoded(encoded: &str) -> Result<Self, AdminError> {
        let encoded = encoded.trim();
        let stripped = encoded.strip_prefix("0x").unwrap_or(encoded);

        if stripped.len() == 64 && stripped.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::from_hex(stripped);
        }

        let base58 = encoded.strip_prefix(NEAR_KEY_PREFIX).unwrap_or(encoded);
        let mut bytes = bs58::decode(base58)
            .into_vec()
            .map_err(|e| AdminError::InvalidKey(format!("Invalid private key encoding: {e}")))?;

        // 64-byte ed25519 keypairs carry the seed in the first half
        let key = match bytes.len() {
            32 | 64 => Self::from_slice(&bytes[..32]),
            n => Err(AdminError::InvalidKey(format!(
                "Invalid private key length: expected 32 or 64 bytes, got {n}"
            ))),
        };
        bytes.zeroize();
        key
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, AdminError> {
        let private_key: [u8; 32] = bytes.try_into().map_err(|_| {
            AdminError::InvalidKey(format!(
                "Invalid private key length: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { private_key })
    }

    /// Create key material from bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { private_key: bytes }
    }

    /// secp256k1 wallet for EVM chains
    pub fn evm_wallet(&self) -> Result<LocalWallet, AdminError> {
        LocalWallet::from_bytes(&self.private_key)
            .map_err(|e| AdminError::InvalidKey(format!("Not a valid secp256k1 key: {e}")))
    }

    /// ed25519 signing key for NEAR and Solana
    pub fn ed25519_signing_key(&self) -> ed25519_dalek::SigningKey {
        ed25519_dalek::SigningKey::from_bytes(&self.private_key)
    }

    /// Get the private key as hex string (for serialization only)
    pub fn to_hex(&self) -> String {
        hex::encode(self.private_key)
    }

    /// Get raw bytes (use with caution)
    pub fn raw_bytes(&self) -> &[u8; 32] {
        &self.private_key
    }
}

impl Clone for KeyMaterial {
    fn clone(&self) -> Self {
        Self::from_bytes(self.private_key)
    }
}
