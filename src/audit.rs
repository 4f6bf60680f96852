use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::chains::{FeeKind, WriteReceipt};
use crate::errors::AdminError;
use crate::networks::NetworkId;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminOperation {
    UpdateFee,
    Withdraw,
}

#[derive(Debug, Serialize)]
pub struct AdminAuditEntry {
    timestamp: DateTime<Utc>,

    // Request info
    source_ip: String,
    network: NetworkId,
    operation: AdminOperation,

    // Operation details
    #[serde(skip_serializing_if = "Option::is_none")]
    fee_kind: Option<FeeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<String>,

    // Result
    reference: Option<String>,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
}

impl AdminAuditEntry {
    pub fn fee_update(network: NetworkId, kind: FeeKind, fee: &str, source_ip: &str) -> Self {
        let mut entry = Self::new(network, AdminOperation::UpdateFee, source_ip);
        entry.fee_kind = Some(kind);
        entry.amount = Some(fee.to_string());
        entry
    }

    pub fn withdrawal(
        network: NetworkId,
        destination: &str,
        amount: Option<&str>,
        source_ip: &str,
    ) -> Self {
        let mut entry = Self::new(network, AdminOperation::Withdraw, source_ip);
        entry.destination = Some(destination.to_string());
        entry.amount = amount.map(str::to_string);
        entry
    }

    fn new(network: NetworkId, operation: AdminOperation, source_ip: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            source_ip: source_ip.to_string(),
            network,
            operation,
            fee_kind: None,
            amount: None,
            destination: None,
            reference: None,
            success: false,
            error: None,
            duration_ms: 0,
        }
    }

    /// Record the outcome of the write
    pub fn record(&mut self, result: &Result<WriteReceipt, AdminError>) {
        match result {
            Ok(receipt) => {
                self.reference = Some(receipt.reference());
                self.success = true;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.success = false;
            }
        }
    }

    pub fn update_duration(&mut self, start_time: std::time::Instant) {
        self.duration_ms = start_time.elapsed().as_millis() as u64;
    }
}

/// Append-only JSON-lines audit log
pub struct AuditLogger {
    file: Arc<Mutex<File>>,
}

impl AuditLogger {
    pub fn new(log_path: &str) -> Result<Self, AdminError> {
        let path = Path::new(log_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AdminError::Internal(format!("Failed to create audit log directory: {e}"))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AdminError::Internal(format!("Failed to open audit log file: {e}")))?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub async fn log(&self, entry: &AdminAuditEntry) -> Result<(), AdminError> {
        let json = serde_json::to_string(entry)?;

        let mut file = self.file.lock().await;
        writeln!(file, "{json}")
            .map_err(|e| AdminError::Internal(format!("Failed to write audit log: {e}")))?;
        file.flush()
            .map_err(|e| AdminError::Internal(format!("Failed to flush audit log: {e}")))?;

        Ok(())
    }
}
