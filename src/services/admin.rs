use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::audit::{AdminAuditEntry, AuditLogger};
use crate::chains::{FeeKind, WriteReceipt};
use crate::controller::AdminController;
use crate::errors::AdminError;

/// Runs controller writes and records each one in the audit log
pub struct AdminService;

impl AdminService {
    pub async fn update_fee(
        controller: &AdminController,
        audit_logger: Option<&Arc<AuditLogger>>,
        kind: FeeKind,
        fee: &str,
        source: &str,
    ) -> Result<WriteReceipt, AdminError> {
        let start_time = Instant::now();
        let result = controller.update_fee(kind, fee).await;

        if let Some(logger) = audit_logger {
            let mut entry = AdminAuditEntry::fee_update(controller.network(), kind, fee, source);
            entry.record(&result);
            entry.update_duration(start_time);
            Self::write(logger, &entry).await;
        }

        result
    }

    pub async fn withdraw(
        controller: &AdminController,
        audit_logger: Option<&Arc<AuditLogger>>,
        destination: &str,
        amount: Option<&str>,
        source: &str,
    ) -> Result<WriteReceipt, AdminError> {
        let start_time = Instant::now();
        let result = controller.withdraw(destination, amount).await;

        if let Some(logger) = audit_logger {
            let mut entry =
                AdminAuditEntry::withdrawal(controller.network(), destination, amount, source);
            entry.record(&result);
            entry.update_duration(start_time);
            Self::write(logger, &entry).await;
        }

        result
    }

    async fn write(logger: &AuditLogger, entry: &AdminAuditEntry) {
        if let Err(e) = logger.log(entry).await {
            warn!("⚠️  Failed to write audit entry: {}", e);
        }
    }
}
