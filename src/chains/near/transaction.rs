//! Borsh wire format for NEAR function-call transactions.

use borsh::BorshSerialize;
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use std::io::{Result as IoResult, Write};

use crate::errors::AdminError;

const ED25519_KEY_TYPE: u8 = 0;
const FUNCTION_CALL_ACTION: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct PublicKey {
    key_type: u8,
    data: [u8; 32],
}

impl PublicKey {
    pub fn ed25519(data: [u8; 32]) -> Self {
        Self {
            key_type: ED25519_KEY_TYPE,
            data,
        }
    }

    /// `ed25519:<base58>` as used by the RPC
    pub fn to_rpc_string(&self) -> String {
        format!("ed25519:{}", bs58::encode(self.data).into_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct FunctionCall {
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FunctionCall(FunctionCall),
}

impl BorshSerialize for Action {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        match self {
            Action::FunctionCall(call) => {
                FUNCTION_CALL_ACTION.serialize(writer)?;
                call.serialize(writer)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct Transaction {
    pub signer_id: String,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: String,
    pub block_hash: [u8; 32],
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, BorshSerialize)]
struct Signature {
    key_type: u8,
    data: [u8; 64],
}

#[derive(Debug, Clone, BorshSerialize)]
pub struct SignedTransaction {
    transaction: Transaction,
    signature: Signature,
}

impl Transaction {
    /// sha256 of the borsh encoding; also the transaction hash
    pub fn hash(&self) -> Result<[u8; 32], AdminError> {
        let bytes = borsh::to_vec(self)
            .map_err(|e| AdminError::Internal(format!("borsh encoding failed: {e}")))?;
        Ok(Sha256::digest(bytes).into())
    }

    pub fn sign(self, key: &SigningKey) -> Result<SignedTransaction, AdminError> {
        let hash = self.hash()?;
        let signature = key.sign(&hash);
        Ok(SignedTransaction {
            transaction: self,
            signature: Signature {
                key_type: ED25519_KEY_TYPE,
                data: signature.to_bytes(),
            },
        })
    }
}

impl SignedTransaction {
    pub fn to_base64(&self) -> Result<String, AdminError> {
        use base64::Engine;

        let bytes = borsh::to_vec(self)
            .map_err(|e| AdminError::Internal(format!("borsh encoding failed: {e}")))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Base58 transaction hash as shown by explorers
    pub fn hash_string(&self) -> Result<String, AdminError> {
        Ok(bs58::encode(self.transaction.hash()?).into_string())
    }
}
