//! Result entry, payout planning, and the confirms that close a bout.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::confirmation::{validate_payout_confirmation, EscrowPayoutConfirmation};
use crate::failure::{build_failure_reason, classify_confirmation_failure};
use crate::models::{
    AuditOutcome, Bout, BoutStatus, BoutWinner, Escrow, EscrowCloseAction, EscrowKind,
    EscrowStatus,
};
use crate::services::escrow_service::{has_full_kind_set, tx_value};
use crate::services::{append_audit_entry, ConfirmError, FlowError};
use crate::store::Store;
use crate::transactions::{build_escrow_cancel_tx, build_escrow_finish_tx};

/// One planned payout step: which escrow, which close action, which payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutPrepareRecord {
    pub escrow_id: Uuid,
    pub escrow_kind: EscrowKind,
    pub action: EscrowCloseAction,
    pub unsigned_tx: Value,
}

/// Drives `CREATED → (FINISHED | CANCELLED)` and the bout's path to CLOSED.
pub struct PayoutService<'a> {
    store: &'a dyn Store,
}

impl<'a> PayoutService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Record the winner. Admin-gated at the boundary; the bout must have its
    /// full escrow set confirmed.
    pub fn enter_bout_result(
        &self,
        bout_id: Uuid,
        winner: BoutWinner,
        actor_user_id: Uuid,
    ) -> Result<Bout, FlowError> {
        let mut bout = self.store.get_bout(bout_id).ok_or(FlowError::BoutNotFound)?;
        if bout.status != BoutStatus::EscrowsCreated {
            return Err(FlowError::BoutNotInEscrowsCreatedState);
        }

        bout.winner = Some(winner);
        bout.status = BoutStatus::ResultEntered;
        self.store
            .update_bout(bout.clone())
            .map_err(|_| FlowError::BoutNotFound)?;
        append_audit_entry(
            self.store,
            Some(actor_user_id),
            "bout_result_enter",
            "bout",
            bout.id.to_string(),
            AuditOutcome::Success,
            json!({"winner": winner, "status": bout.status}),
        );
        tracing::info!(bout_id = %bout.id, winner = %winner, "bout result entered");
        Ok(bout)
    }

    /// Build the deterministic payout plan: SHOW_A finish, SHOW_B finish,
    /// winner bonus finish (with fulfillment), loser bonus cancel.
    ///
    /// Escrows already settled consistently with the plan are silently
    /// skipped so the promoter can re-prepare mid-flight.
    pub fn prepare_payout_payloads(
        &self,
        bout_id: Uuid,
    ) -> Result<(Bout, Vec<PayoutPrepareRecord>), FlowError> {
        let bout = self.store.get_bout(bout_id).ok_or(FlowError::BoutNotFound)?;
        if !bout.status.allows_payout() {
            return Err(FlowError::BoutNotPreparableForPayout);
        }
        let winner = bout.winner.ok_or(FlowError::BoutWinnerNotSet)?;

        let escrows = self.load_escrow_set(bout_id)?;
        let escrow_for = |kind: EscrowKind| -> Result<&Escrow, FlowError> {
            escrows
                .iter()
                .find(|escrow| escrow.kind == kind)
                .ok_or(FlowError::BoutEscrowSetInvalid)
        };

        let (winner_bonus_kind, loser_bonus_kind) = winner.bonus_kinds();
        let plan = [
            (EscrowKind::ShowA, EscrowCloseAction::Finish, None),
            (EscrowKind::ShowB, EscrowCloseAction::Finish, None),
            (
                winner_bonus_kind,
                EscrowCloseAction::Finish,
                Some(required_fulfillment_hex(escrow_for(winner_bonus_kind)?)?),
            ),
            (loser_bonus_kind, EscrowCloseAction::Cancel, None),
        ];

        let mut items = Vec::with_capacity(plan.len());
        for (kind, action, fulfillment_hex) in plan {
            let escrow = escrow_for(kind)?;
            if escrow.status == EscrowStatus::Created {
                let unsigned_tx = match action {
                    EscrowCloseAction::Finish => {
                        tx_value(&build_escrow_finish_tx(escrow, fulfillment_hex.as_deref())?)
                    }
                    EscrowCloseAction::Cancel => tx_value(&build_escrow_cancel_tx(escrow)?),
                };
                items.push(PayoutPrepareRecord {
                    escrow_id: escrow.id,
                    escrow_kind: escrow.kind,
                    action,
                    unsigned_tx,
                });
                continue;
            }
            if action.is_settled(escrow.status) {
                continue;
            }
            return Err(FlowError::EscrowNotPreparableForPayout);
        }
        Ok((bout, items))
    }

    /// Apply one observed finish/cancel confirmation.
    ///
    /// The expected action and fulfillment are resolved from the winner and
    /// the escrow kind, never trusted from the caller. The first validated
    /// payout moves the bout to PAYOUTS_IN_PROGRESS; once both shows and the
    /// winner bonus are FINISHED the bout closes. The loser bonus never
    /// blocks closure.
    pub fn confirm_payout(
        &self,
        bout_id: Uuid,
        escrow_kind: EscrowKind,
        confirmation: &EscrowPayoutConfirmation,
    ) -> Result<(Bout, Escrow), ConfirmError> {
        let mut bout = self.store.get_bout(bout_id).ok_or(FlowError::BoutNotFound)?;
        if !bout.status.allows_payout() {
            return Err(FlowError::BoutNotInPayoutState.into());
        }
        let winner = bout.winner.ok_or(FlowError::BoutWinnerNotSet)?;

        let mut escrow = self
            .store
            .get_escrow(bout_id, escrow_kind)
            .ok_or(FlowError::EscrowNotFound)?;
        if escrow.status != EscrowStatus::Created {
            return Err(FlowError::EscrowNotCreated.into());
        }

        let (expected_action, expected_fulfillment) = expected_action_for_escrow(winner, &escrow)?;

        if let Err(validation) = validate_payout_confirmation(
            &escrow,
            confirmation,
            expected_action,
            expected_fulfillment.as_deref(),
        ) {
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
                "escrow_payout_confirm",
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
                "payout confirmation rejected"
            );
            return Err(ConfirmError::Confirmation { code, validation });
        }

        escrow.status = expected_action.target_status();
        escrow.close_tx_hash = Some(confirmation.tx_hash.clone());
        escrow.clear_failure();
        self.store
            .update_escrow(escrow.clone())
            .map_err(|_| FlowError::EscrowNotFound)?;

        if bout.status == BoutStatus::ResultEntered {
            bout.status = BoutStatus::PayoutsInProgress;
            self.store
                .update_bout(bout.clone())
                .map_err(|_| FlowError::BoutNotFound)?;
        }
        append_audit_entry(
            self.store,
            None,
            "escrow_payout_confirm",
            "escrow",
            escrow.id.to_string(),
            AuditOutcome::Success,
            json!({
                "escrow_kind": escrow.kind,
                "status": escrow.status,
                "tx_hash": confirmation.tx_hash,
                "bout_status": bout.status,
            }),
        );

        let escrows = self.load_escrow_set(bout_id)?;
        if can_close_bout(winner, &escrows) {
            bout.status = BoutStatus::Closed;
            self.store
                .update_bout(bout.clone())
                .map_err(|_| FlowError::BoutNotFound)?;
            append_audit_entry(
                self.store,
                None,
                "bout_closed",
                "bout",
                bout.id.to_string(),
                AuditOutcome::Success,
                json!({"status": bout.status}),
            );
            tracing::info!(bout_id = %bout.id, "bout closed");
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

fn expected_action_for_escrow(
    winner: BoutWinner,
    escrow: &Escrow,
) -> Result<(EscrowCloseAction, Option<String>), FlowError> {
    let (winner_bonus_kind, loser_bonus_kind) = winner.bonus_kinds();
    match escrow.kind {
        EscrowKind::ShowA | EscrowKind::ShowB => Ok((EscrowCloseAction::Finish, None)),
        kind if kind == winner_bonus_kind => Ok((
            EscrowCloseAction::Finish,
            Some(required_fulfillment_hex(escrow)?),
        )),
        kind if kind == loser_bonus_kind => Ok((EscrowCloseAction::Cancel, None)),
        _ => Err(FlowError::EscrowKindNotSupported),
    }
}

fn required_fulfillment_hex(escrow: &Escrow) -> Result<String, FlowError> {
    match escrow.encrypted_preimage_hex.as_deref() {
        Some(preimage) if !preimage.is_empty() => Ok(preimage.to_string()),
        _ => Err(FlowError::WinnerBonusFulfillmentMissing),
    }
}

fn can_close_bout(winner: BoutWinner, escrows: &[Escrow]) -> bool {
    let (winner_bonus_kind, _) = winner.bonus_kinds();
    let finished = |kind: EscrowKind| {
        escrows
            .iter()
            .any(|escrow| escrow.kind == kind && escrow.status == EscrowStatus::Finished)
    };
    finished(EscrowKind::ShowA) && finished(EscrowKind::ShowB) && finished(winner_bonus_kind)
}
