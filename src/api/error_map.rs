//! Mapping of typed service failures onto transport status codes and detail
//! sentences. The sentences are part of the client contract and are kept
//! stable; the machine-readable code lives in the persisted escrow state.

use crate::api::ApiError;
use crate::failure::FailureCode;
use crate::services::{ConfirmError, FlowError, ReconcileError};
use crate::xaman::XamanIntegrationError;

fn confirmation_failure_detail(code: FailureCode) -> &'static str {
    match code {
        FailureCode::SigningDeclined => "Signing was declined; no state transition was applied.",
        FailureCode::ConfirmationTimeout => {
            "Confirmation timed out or remained unvalidated; no state transition was applied."
        }
        FailureCode::LedgerTecTem => {
            "Ledger transaction was rejected with tec/tem; no state transition was applied."
        }
        FailureCode::LedgerNotSuccess => {
            "Ledger transaction did not succeed; no state transition was applied."
        }
        FailureCode::LedgerNotValidated => {
            "Ledger transaction was not validated; no state transition was applied."
        }
        FailureCode::InvalidConfirmation | FailureCode::SigningExpired => {
            "Ledger confirmation failed validation."
        }
    }
}

pub fn map_escrow_prepare_error(error: FlowError) -> ApiError {
    match error {
        FlowError::BoutNotFound => ApiError::new(404, "Bout was not found."),
        FlowError::BoutNotPreparableForEscrowCreate | FlowError::EscrowNotPreparableForCreate => {
            ApiError::new(409, "Escrow create prepare is not allowed in the current state.")
        }
        _ => ApiError::new(422, "Bout escrow plan is invalid."),
    }
}

pub fn map_escrow_create_confirm_error(error: &ConfirmError) -> (u16, &'static str) {
    match error {
        ConfirmError::Flow(FlowError::BoutNotFound) | ConfirmError::Flow(FlowError::EscrowNotFound) => {
            (404, "Requested bout/escrow was not found.")
        }
        ConfirmError::Flow(FlowError::BoutNotInDraftState)
        | ConfirmError::Flow(FlowError::EscrowNotPlanned) => {
            (409, "Escrow confirmation is not allowed in current state.")
        }
        ConfirmError::Confirmation { code, .. } => (422, confirmation_failure_detail(*code)),
        ConfirmError::Flow(_) => (400, "Escrow confirmation request is invalid."),
    }
}

pub fn map_result_error(error: FlowError) -> ApiError {
    match error {
        FlowError::BoutNotFound => ApiError::new(404, "Requested bout was not found."),
        FlowError::BoutNotInEscrowsCreatedState => {
            ApiError::new(409, "Bout result cannot be entered in current state.")
        }
        _ => ApiError::new(400, "Bout result request is invalid."),
    }
}

pub fn map_payout_prepare_error(error: FlowError) -> ApiError {
    match error {
        FlowError::BoutNotFound => ApiError::new(404, "Requested bout was not found."),
        FlowError::BoutNotPreparableForPayout
        | FlowError::EscrowNotPreparableForPayout
        | FlowError::BoutWinnerNotSet => {
            ApiError::new(409, "Payout prepare is not allowed in current state.")
        }
        FlowError::BoutEscrowSetInvalid | FlowError::WinnerBonusFulfillmentMissing => {
            ApiError::new(422, "Payout setup is invalid.")
        }
        _ => ApiError::new(400, "Payout prepare request is invalid."),
    }
}

pub fn map_payout_confirm_error(error: &ConfirmError) -> (u16, &'static str) {
    match error {
        ConfirmError::Flow(FlowError::BoutNotFound) | ConfirmError::Flow(FlowError::EscrowNotFound) => {
            (404, "Requested bout/escrow was not found.")
        }
        ConfirmError::Flow(FlowError::BoutNotInPayoutState)
        | ConfirmError::Flow(FlowError::EscrowNotCreated)
        | ConfirmError::Flow(FlowError::BoutWinnerNotSet) => {
            (409, "Payout confirmation is not allowed in current state.")
        }
        ConfirmError::Confirmation { code, .. } => (422, confirmation_failure_detail(*code)),
        ConfirmError::Flow(FlowError::WinnerBonusFulfillmentMissing)
        | ConfirmError::Flow(FlowError::BoutEscrowSetInvalid) => (422, "Payout setup is invalid."),
        ConfirmError::Flow(_) => (400, "Payout confirmation request is invalid."),
    }
}

pub fn map_signing_reconcile_error(error: &ReconcileError) -> ApiError {
    match error {
        ReconcileError::Flow(FlowError::BoutNotFound) | ReconcileError::Flow(FlowError::EscrowNotFound) => {
            ApiError::new(404, "Requested bout/escrow was not found.")
        }
        ReconcileError::Xaman(XamanIntegrationError::XamanObservedStatusInvalid) => {
            ApiError::new(400, "Observed signing status is invalid.")
        }
        ReconcileError::Xaman(_) => {
            ApiError::new(502, "Xaman payload status could not be reconciled.")
        }
        ReconcileError::Flow(_) => ApiError::new(400, "Signing reconciliation request is invalid."),
    }
}
