//! Observation of remote sign-payload status.
//!
//! Reconciliation updates only the signing failure marker on an escrow; the
//! escrow state machine moves exclusively through validated ledger
//! confirmations. A payload the promoter declined or let expire stamps a
//! `signing_*` failure code; a later signed observation clears it.

use thiserror::Error;
use serde_json::json;
use uuid::Uuid;

use crate::failure::FailureCode;
use crate::models::{AuditOutcome, Bout, Escrow, EscrowKind};
use crate::services::{append_audit_entry, FlowError};
use crate::store::Store;
use crate::xaman::{XamanClient, XamanIntegrationError, XamanPayloadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Xaman(#[from] XamanIntegrationError),
}

/// What one reconciliation pass observed and left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningReconciliationOutcome {
    pub bout: Bout,
    pub escrow: Escrow,
    pub payload_id: String,
    pub signing_status: XamanPayloadStatus,
    pub tx_hash: Option<String>,
}

/// Reconciles wallet-side payload status into escrow failure markers.
pub struct SigningReconciliation<'a> {
    store: &'a dyn Store,
    xaman: &'a XamanClient,
}

impl<'a> SigningReconciliation<'a> {
    pub fn new(store: &'a dyn Store, xaman: &'a XamanClient) -> Self {
        Self { store, xaman }
    }

    pub async fn reconcile_escrow_create_signing(
        &self,
        bout_id: Uuid,
        escrow_kind: EscrowKind,
        payload_id: &str,
        actor_user_id: Uuid,
        observed_status: Option<&str>,
        observed_tx_hash: Option<&str>,
    ) -> Result<SigningReconciliationOutcome, ReconcileError> {
        self.reconcile(
            bout_id,
            escrow_kind,
            payload_id,
            actor_user_id,
            observed_status,
            observed_tx_hash,
            "escrow_signing_reconcile",
        )
        .await
    }

    pub async fn reconcile_payout_signing(
        &self,
        bout_id: Uuid,
        escrow_kind: EscrowKind,
        payload_id: &str,
        actor_user_id: Uuid,
        observed_status: Option<&str>,
        observed_tx_hash: Option<&str>,
    ) -> Result<SigningReconciliationOutcome, ReconcileError> {
        self.reconcile(
            bout_id,
            escrow_kind,
            payload_id,
            actor_user_id,
            observed_status,
            observed_tx_hash,
            "payout_signing_reconcile",
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn reconcile(
        &self,
        bout_id: Uuid,
        escrow_kind: EscrowKind,
        payload_id: &str,
        actor_user_id: Uuid,
        observed_status: Option<&str>,
        observed_tx_hash: Option<&str>,
        action: &str,
    ) -> Result<SigningReconciliationOutcome, ReconcileError> {
        let bout = self.store.get_bout(bout_id).ok_or(FlowError::BoutNotFound)?;
        let mut escrow = self
            .store
            .get_escrow(bout_id, escrow_kind)
            .ok_or(FlowError::EscrowNotFound)?;

        let status_result = self
            .xaman
            .get_payload_status(payload_id, observed_status, observed_tx_hash)
            .await?;

        self.apply_failure_classification(
            &mut escrow,
            &status_result.payload_id,
            status_result.status,
            status_result.tx_hash.as_deref(),
        )?;

        let outcome = status_to_outcome(status_result.status);
        append_audit_entry(
            self.store,
            Some(actor_user_id),
            action,
            "escrow",
            escrow.id.to_string(),
            outcome,
            json!({
                "bout_id": bout.id,
                "escrow_kind": escrow.kind,
                "escrow_status": escrow.status,
                "payload_id": status_result.payload_id,
                "signing_status": status_result.status,
                "tx_hash": status_result.tx_hash,
                "failure_code": escrow.failure_code,
                "mode": status_result.mode,
            }),
        );
        tracing::debug!(
            bout_id = %bout_id,
            escrow_kind = %escrow_kind,
            signing_status = %status_result.status,
            "signing payload reconciled"
        );

        Ok(SigningReconciliationOutcome {
            bout,
            escrow,
            payload_id: status_result.payload_id,
            signing_status: status_result.status,
            tx_hash: status_result.tx_hash,
        })
    }

    fn apply_failure_classification(
        &self,
        escrow: &mut Escrow,
        payload_id: &str,
        status: XamanPayloadStatus,
        tx_hash: Option<&str>,
    ) -> Result<(), FlowError> {
        match status {
            XamanPayloadStatus::Declined => {
                escrow.mark_failure(
                    FailureCode::SigningDeclined.to_string(),
                    build_signing_failure_reason(payload_id, status, tx_hash),
                );
            }
            XamanPayloadStatus::Expired => {
                escrow.mark_failure(
                    FailureCode::SigningExpired.to_string(),
                    build_signing_failure_reason(payload_id, status, tx_hash),
                );
            }
            XamanPayloadStatus::Signed => {
                let had_signing_failure = matches!(
                    escrow.failure_code.as_deref(),
                    Some("signing_declined") | Some("signing_expired")
                );
                if !had_signing_failure {
                    return Ok(());
                }
                escrow.clear_failure();
            }
            XamanPayloadStatus::Open | XamanPayloadStatus::Unknown => return Ok(()),
        }
        self.store
            .update_escrow(escrow.clone())
            .map_err(|_| FlowError::EscrowNotFound)
    }
}

fn status_to_outcome(status: XamanPayloadStatus) -> AuditOutcome {
    match status {
        XamanPayloadStatus::Open => AuditOutcome::Pending,
        XamanPayloadStatus::Declined | XamanPayloadStatus::Expired => AuditOutcome::Rejected,
        XamanPayloadStatus::Signed => AuditOutcome::Observed,
        XamanPayloadStatus::Unknown => AuditOutcome::Unknown,
    }
}

fn build_signing_failure_reason(
    payload_id: &str,
    status: XamanPayloadStatus,
    tx_hash: Option<&str>,
) -> String {
    format!(
        "payload_id={payload_id};signing_status={status};tx_hash={}",
        tx_hash.unwrap_or("none")
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outcome_mapping_matches_audit_vocabulary() {
        assert_eq!(status_to_outcome(XamanPayloadStatus::Open), AuditOutcome::Pending);
        assert_eq!(
            status_to_outcome(XamanPayloadStatus::Declined),
            AuditOutcome::Rejected
        );
        assert_eq!(
            status_to_outcome(XamanPayloadStatus::Signed),
            AuditOutcome::Observed
        );
        assert_eq!(
            status_to_outcome(XamanPayloadStatus::Unknown),
            AuditOutcome::Unknown
        );
    }

    #[test]
    fn reason_includes_payload_and_hash() {
        assert_eq!(
            build_signing_failure_reason("pl-1", XamanPayloadStatus::Declined, Some("TX1")),
            "payload_id=pl-1;signing_status=declined;tx_hash=TX1"
        );
        assert_eq!(
            build_signing_failure_reason("pl-1", XamanPayloadStatus::Expired, None),
            "payload_id=pl-1;signing_status=expired;tx_hash=none"
        );
    }
}
