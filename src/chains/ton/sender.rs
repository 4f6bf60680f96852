//! Wallet transaction requests and the senders that deliver them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AdminError;

/// One outgoing internal message, TonConnect shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonMessage {
    pub address: String,
    /// Attached value in nanotons
    pub amount: String,
    /// Base64 BOC of the message body
    pub payload: String,
}

/// Transaction request for an external TON wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TonTransactionRequest {
    /// Unix seconds after which the wallet must refuse the request
    pub valid_until: i64,
    pub messages: Vec<TonMessage>,
    /// `ton://transfer` link carrying the same message
    pub deeplink: String,
}

impl TonTransactionRequest {
    pub fn single(address: &str, amount: u128, body_boc: &[u8], valid_until: i64) -> Self {
        use base64::Engine;

        let payload = base64::engine::general_purpose::STANDARD.encode(body_boc);
        let bin = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(body_boc);
        let deeplink =
            format!("ton://transfer/{address}?amount={amount}&bin={bin}&exp={valid_until}");

        Self {
            valid_until,
            messages: vec![TonMessage {
                address: address.to_string(),
                amount: amount.to_string(),
                payload,
            }],
            deeplink,
        }
    }
}

/// Hands a request to the operator's wallet
#[async_trait]
pub trait TonSender: Send + Sync {
    async fn send(&self, request: &TonTransactionRequest) -> Result<(), AdminError>;
}

/// Leaves delivery to the caller, which receives the request in the write receipt
#[derive(Debug, Default)]
pub struct ReturnToCaller;

#[async_trait]
impl TonSender for ReturnToCaller {
    async fn send(&self, request: &TonTransactionRequest) -> Result<(), AdminError> {
        info!("📨 TON wallet request ready: {}", request.deeplink);
        Ok(())
    }
}

/// Appends requests as JSON lines to a file watched by a wallet bridge
pub struct OutboxSender {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OutboxSender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TonSender for OutboxSender {
    async fn send(&self, request: &TonTransactionRequest) -> Result<(), AdminError> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                AdminError::SubmissionError(format!(
                    "cannot open TON outbox {}: {e}",
                    self.path.display()
                ))
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AdminError::SubmissionError(format!("cannot write TON outbox: {e}")))?;
        file.flush()
            .await
            .map_err(|e| AdminError::SubmissionError(format!("cannot write TON outbox: {e}")))?;

        info!("📨 TON wallet request written to {}", self.path.display());
        Ok(())
    }
}
