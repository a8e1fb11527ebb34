//! Business services driving the bout and escrow state machines.

pub mod bout_planner;
pub mod escrow_service;
pub mod payout_service;
pub mod signing_reconciliation;

pub use bout_planner::{BoutPlanner, CreateBoutDraft, PlanError};
pub use escrow_service::{EscrowPrepareRecord, EscrowService};
pub use payout_service::{PayoutPrepareRecord, PayoutService};
pub use signing_reconciliation::{
    ReconcileError, SigningReconciliation, SigningReconciliationOutcome,
};

use serde_json::Value;
use strum_macros::Display;
use uuid::Uuid;

use crate::confirmation::LedgerValidationError;
use crate::failure::FailureCode;
use crate::idempotency::canonical_json;
use crate::models::{AuditLog, AuditOutcome};
use crate::store::Store;
use crate::transactions::TxBuildError;

/// State-machine and lookup rejections. Codes are stable and drive the
/// transport status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowError {
    BoutNotFound,
    EscrowNotFound,
    BoutFightersMustDiffer,
    BoutNotInDraftState,
    EscrowNotPlanned,
    BoutNotPreparableForEscrowCreate,
    EscrowNotPreparableForCreate,
    BoutEscrowSetInvalid,
    BoutNotInEscrowsCreatedState,
    BoutNotPreparableForPayout,
    BoutNotInPayoutState,
    BoutWinnerNotSet,
    EscrowNotCreated,
    EscrowNotPreparableForPayout,
    WinnerBonusFulfillmentMissing,
    EscrowKindNotSupported,
    EscrowOfferSequenceMissing,
    FulfillmentHexInvalid,
}

impl std::error::Error for FlowError {}

impl From<TxBuildError> for FlowError {
    fn from(error: TxBuildError) -> Self {
        match error {
            TxBuildError::EscrowOfferSequenceMissing => FlowError::EscrowOfferSequenceMissing,
            TxBuildError::FulfillmentHexInvalid => FlowError::FulfillmentHexInvalid,
        }
    }
}

/// Rejection of an idempotent confirm attempt: either the flow guard tripped
/// before validation, or the confirmation itself failed and was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmError {
    Flow(FlowError),
    Confirmation {
        code: FailureCode,
        validation: LedgerValidationError,
    },
}

impl std::fmt::Display for ConfirmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmError::Flow(error) => write!(f, "{error}"),
            ConfirmError::Confirmation { code, .. } => write!(f, "{code}"),
        }
    }
}

impl std::error::Error for ConfirmError {}

impl From<FlowError> for ConfirmError {
    fn from(error: FlowError) -> Self {
        ConfirmError::Flow(error)
    }
}

/// Append one audit row with canonical-JSON details.
pub(crate) fn append_audit_entry(
    store: &dyn Store,
    actor_user_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: String,
    outcome: AuditOutcome,
    details: Value,
) {
    store.append_audit(AuditLog::new(
        actor_user_id,
        action,
        entity_type,
        entity_id,
        outcome,
        canonical_json(&details),
    ));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flow_codes_are_stable() {
        assert_eq!(FlowError::BoutNotInDraftState.to_string(), "bout_not_in_draft_state");
        assert_eq!(FlowError::EscrowNotPlanned.to_string(), "escrow_not_planned");
        assert_eq!(
            FlowError::WinnerBonusFulfillmentMissing.to_string(),
            "winner_bonus_fulfillment_missing"
        );
        assert_eq!(
            FlowError::EscrowOfferSequenceMissing.to_string(),
            "escrow_offer_sequence_missing"
        );
    }

    #[test]
    fn confirm_error_displays_the_classified_code() {
        let error = ConfirmError::Confirmation {
            code: FailureCode::LedgerTecTem,
            validation: LedgerValidationError::LedgerTxNotSuccess,
        };
        assert_eq!(error.to_string(), "ledger_tec_tem");
    }
}
