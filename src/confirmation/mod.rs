//! Validation of observed ledger transactions against recorded escrow plans.
//!
//! The validators are pure predicates: they compare an observed confirmation
//! bit-for-bit against the plan stored on the escrow row and report the first
//! mismatch as a stable code. They never mutate state; the services decide
//! what a failed validation does to the aggregate.

use strum_macros::Display;

use crate::models::{Escrow, EscrowCloseAction};
use crate::utils::hex_conversion::normalize_optional_hex;

/// XRPL engine result recorded for a successfully applied transaction.
pub const ENGINE_RESULT_SUCCESS: &str = "tesSUCCESS";

/// First mismatch found between an observed confirmation and the recorded
/// plan. Codes are stable and wire-visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LedgerValidationError {
    LedgerTxNotValidated,
    LedgerTxNotSuccess,
    LedgerOwnerAddressMismatch,
    LedgerDestinationAddressMismatch,
    LedgerAmountMismatch,
    LedgerFinishAfterMismatch,
    LedgerCancelAfterMismatch,
    LedgerConditionMismatch,
    LedgerOfferSequenceMismatch,
    LedgerTxTypeMismatch,
    LedgerFinishBeforeAllowed,
    LedgerFulfillmentMismatch,
    LedgerUnexpectedFulfillment,
    LedgerCancelAfterMissing,
    LedgerCancelBeforeAllowed,
}

impl std::error::Error for LedgerValidationError {}

/// An EscrowCreate transaction as observed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowCreateConfirmation {
    pub tx_hash: String,
    pub offer_sequence: u32,
    pub validated: bool,
    pub engine_result: String,
    pub owner_address: String,
    pub destination_address: String,
    pub amount_drops: i64,
    pub finish_after_ripple: i64,
    pub cancel_after_ripple: Option<i64>,
    pub condition_hex: Option<String>,
}

/// An EscrowFinish or EscrowCancel transaction as observed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowPayoutConfirmation {
    pub tx_hash: String,
    pub validated: bool,
    pub engine_result: String,
    pub transaction_type: String,
    pub owner_address: String,
    pub offer_sequence: u32,
    pub close_time_ripple: i64,
    pub fulfillment_hex: Option<String>,
}

/// Accept or reject an observed EscrowCreate against the planned escrow.
pub fn validate_escrow_create_confirmation(
    escrow: &Escrow,
    confirmation: &EscrowCreateConfirmation,
) -> Result<(), LedgerValidationError> {
    if !confirmation.validated {
        return Err(LedgerValidationError::LedgerTxNotValidated);
    }
    if confirmation.engine_result != ENGINE_RESULT_SUCCESS {
        return Err(LedgerValidationError::LedgerTxNotSuccess);
    }
    if confirmation.owner_address != escrow.owner_address {
        return Err(LedgerValidationError::LedgerOwnerAddressMismatch);
    }
    if confirmation.destination_address != escrow.destination_address {
        return Err(LedgerValidationError::LedgerDestinationAddressMismatch);
    }
    if confirmation.amount_drops != escrow.amount_drops {
        return Err(LedgerValidationError::LedgerAmountMismatch);
    }
    if confirmation.finish_after_ripple != escrow.finish_after_ripple {
        return Err(LedgerValidationError::LedgerFinishAfterMismatch);
    }
    if confirmation.cancel_after_ripple != escrow.cancel_after_ripple {
        return Err(LedgerValidationError::LedgerCancelAfterMismatch);
    }

    let expected = normalize_optional_hex(escrow.condition_hex.as_deref())
        .map_err(|_| LedgerValidationError::LedgerConditionMismatch)?;
    let provided = normalize_optional_hex(confirmation.condition_hex.as_deref())
        .map_err(|_| LedgerValidationError::LedgerConditionMismatch)?;
    if provided != expected {
        return Err(LedgerValidationError::LedgerConditionMismatch);
    }
    Ok(())
}

/// Accept or reject an observed finish/cancel against the recorded escrow and
/// the action the payout plan expects for it.
pub fn validate_payout_confirmation(
    escrow: &Escrow,
    confirmation: &EscrowPayoutConfirmation,
    expected_action: EscrowCloseAction,
    expected_fulfillment_hex: Option<&str>,
) -> Result<(), LedgerValidationError> {
    if !confirmation.validated {
        return Err(LedgerValidationError::LedgerTxNotValidated);
    }
    if confirmation.engine_result != ENGINE_RESULT_SUCCESS {
        return Err(LedgerValidationError::LedgerTxNotSuccess);
    }
    if confirmation.owner_address != escrow.owner_address {
        return Err(LedgerValidationError::LedgerOwnerAddressMismatch);
    }
    if escrow.offer_sequence != Some(confirmation.offer_sequence) {
        return Err(LedgerValidationError::LedgerOfferSequenceMismatch);
    }

    match expected_action {
        EscrowCloseAction::Finish => {
            if confirmation.transaction_type != "EscrowFinish" {
                return Err(LedgerValidationError::LedgerTxTypeMismatch);
            }
            if confirmation.close_time_ripple < escrow.finish_after_ripple {
                return Err(LedgerValidationError::LedgerFinishBeforeAllowed);
            }
            let expected = normalize_optional_hex(expected_fulfillment_hex)
                .map_err(|_| LedgerValidationError::LedgerFulfillmentMismatch)?;
            let provided = normalize_optional_hex(confirmation.fulfillment_hex.as_deref())
                .map_err(|_| LedgerValidationError::LedgerFulfillmentMismatch)?;
            match (expected, provided) {
                (Some(expected), provided) => {
                    if provided.as_deref() != Some(expected.as_str()) {
                        return Err(LedgerValidationError::LedgerFulfillmentMismatch);
                    }
                }
                (None, Some(_)) => {
                    return Err(LedgerValidationError::LedgerUnexpectedFulfillment);
                }
                (None, None) => {}
            }
        }
        EscrowCloseAction::Cancel => {
            if confirmation.transaction_type != "EscrowCancel" {
                return Err(LedgerValidationError::LedgerTxTypeMismatch);
            }
            let cancel_after = escrow
                .cancel_after_ripple
                .ok_or(LedgerValidationError::LedgerCancelAfterMissing)?;
            if confirmation.close_time_ripple < cancel_after {
                return Err(LedgerValidationError::LedgerCancelBeforeAllowed);
            }
            if confirmation.fulfillment_hex.is_some() {
                return Err(LedgerValidationError::LedgerUnexpectedFulfillment);
            }
        }
    }
    Ok(())
}
