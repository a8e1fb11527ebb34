//! EscrowCreate round-trip: prepare unsigned payloads, confirm observations.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::confirmation::{validate_escrow_create_confirmation, EscrowCreateConfirmation};
use crate::failure::{build_failure_reason, classify_confirmation_failure};
use crate::models::{AuditOutcome, Bout, BoutStatus, Escrow, EscrowKind, EscrowStatus};
use crate::services::{append_audit_entry, ConfirmError, FlowError};
use crate::store::Store;
use crate::transactions::build_escrow_create_tx;

/// One prepared escrow: its id, kind, and the unsigned transaction to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowPrepareRecord {
    pub escrow_id: Uuid,
    pub escrow_kind: EscrowKind,
    pub unsigned_tx: Value,
}

/// Drives `PLANNED → CREATED` for the four escrows of a bout.
pub struct EscrowService<'a> {
    store: &'a dyn Store,
}

impl<'a> EscrowService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Emit the EscrowCreate payload for every escrow of the bout, in kind
    /// order. Read-only: re-preparing after a partial confirm round is safe.
    pub fn prepare_escrow_create_payloads(
        &self,
        bout_id: Uuid,
    ) -> Result<(Bout, Vec<EscrowPrepareRecord>), FlowError> {
        let bout = self.store.get_bout(bout_id).ok_or(FlowError::BoutNotFound)?;
        if !bout.status.allows_escrow_prepare() {
            return Err(FlowError::BoutNotPreparableForEscrowCreate);
        }

        let escrows = self.load_escrow_set(bout_id)?;
        let mut items = Vec::with_capacity(escrows.len());
        for escrow in &escrows {
            if !matches!(escrow.status, EscrowStatus::Planned | EscrowStatus::Created) {
                return Err(FlowError::EscrowNotPreparableForCreate);
            }
            items.push(EscrowPrepareRecord {
                escrow_id: escrow.id,
                escrow_kind: escrow.kind,
                unsigned_tx: tx_value(&build_escrow_create_tx(escrow)),
            });
        }
        Ok((bout, items))
    }

    /// Apply one observed EscrowCreate confirmation.
    ///
    /// A validation failure stamps the classified failure code on the escrow,
    /// writes a rejected audit row, and leaves the state machine untouched.
    /// Success records `offer_sequence`/`create_tx_hash` and, once all four
    /// escrows are CREATED, promotes the bout to ESCROWS_CREATED.
    pub fn confirm_escrow_create(
        &self,
        bout_id: Uuid,
        escrow_kind: EscrowKind,
        confirmation: &EscrowCreateConfirmation,
    ) -> Result<(Bout, Escrow), ConfirmError> {
        let mut bout = self.store.get_bout(bout_id).ok_or(FlowError::BoutNotFound)?;
        if bout.status != BoutStatus::Draft {
            return Err(FlowError::BoutNotInDraftState.into());
        }
        let mut escrow = self
            .store
            .get_escrow(bout_id, escrow_kind)
            .ok_or(FlowError::EscrowNotFound)?;
        if escrow.status != EscrowStatus::Planned {
            return Err(FlowError::EscrowNotPlanned.into());
        }

        if let Err(validation) = validate_escrow_create_confirmation(&escrow, confirmation) {
            let code = classify_confirmation_failure(
                validation,
                confirmation.validated,
                &confirmation.engine_result,
            );
            escrow.mark_failure(
                code.to_string(),
                build_failure_reason(validation, confirmation.validated, &confirmation.engine_result),
            );
            self.store
                .update_escrow(escrow.clone())
                .map_err(|_| FlowError::EscrowNotFound)?;
            append_audit_entry(
                self.store,
                None,
                "escrow_create_confirm",
                "escrow",
                escrow.id.to_string(),
                AuditOutcome::Rejected,
                json!({
                    "reason": validation.to_string(),
                    "escrow_kind": escrow.kind,
                    "tx_hash": confirmation.tx_hash,
                }),
            );
            tracing::warn!(
                bout_id = %bout_id,
                escrow_kind = %escrow_kind,
                code = %code,
                "escrow create confirmation rejected"
            );
            return Err(ConfirmError::Confirmation { code, validation });
        }

        escrow.status = EscrowStatus::Created;
        escrow.offer_sequence = Some(confirmation.offer_sequence);
        escrow.create_tx_hash = Some(confirmation.tx_hash.clone());
        escrow.clear_failure();
        self.store
            .update_escrow(escrow.clone())
            .map_err(|_| FlowError::EscrowNotFound)?;
        append_audit_entry(
            self.store,
            None,
            "escrow_create_confirm",
            "escrow",
            escrow.id.to_string(),
            AuditOutcome::Success,
            json!({
                "escrow_kind": escrow.kind,
                "tx_hash": confirmation.tx_hash,
                "offer_sequence": confirmation.offer_sequence,
            }),
        );

        let escrows = self.store.list_escrows(bout_id);
        if has_full_kind_set(&escrows)
            && escrows.iter().all(|item| item.status == EscrowStatus::Created)
        {
            bout.status = BoutStatus::EscrowsCreated;
            self.store
                .update_bout(bout.clone())
                .map_err(|_| FlowError::BoutNotFound)?;
            append_audit_entry(
                self.store,
                None,
                "bout_escrows_created",
                "bout",
                bout.id.to_string(),
                AuditOutcome::Success,
                json!({"status": bout.status}),
            );
            tracing::info!(bout_id = %bout.id, "all escrows created, bout promoted");
        }

        Ok((bout, escrow))
    }

    fn load_escrow_set(&self, bout_id: Uuid) -> Result<Vec<Escrow>, FlowError> {
        let escrows = self.store.list_escrows(bout_id);
        if !has_full_kind_set(&escrows) {
            return Err(FlowError::BoutEscrowSetInvalid);
        }
        Ok(escrows)
    }
}

pub(crate) fn has_full_kind_set(escrows: &[Escrow]) -> bool {
    escrows.len() == EscrowKind::ALL.len()
        && EscrowKind::ALL
            .iter()
            .all(|kind| escrows.iter().any(|escrow| escrow.kind == *kind))
}

pub(crate) fn tx_value<T: serde::Serialize>(tx: &T) -> Value {
    serde_json::to_value(tx).expect("escrow transaction payloads serialize to JSON objects")
}
