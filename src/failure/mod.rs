//! Classification of confirmation failures into stable user-facing codes.
//!
//! Wallets and intermediaries report declines and timeouts in several spellings;
//! the classifier folds them into one retry-relevant code per failure and emits
//! a machine-parseable reason string for the audit trail.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::confirmation::LedgerValidationError;

/// Stable failure code persisted on the escrow and surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    SigningDeclined,
    SigningExpired,
    ConfirmationTimeout,
    LedgerTecTem,
    LedgerNotSuccess,
    LedgerNotValidated,
    InvalidConfirmation,
}

const DECLINED_ENGINE_RESULTS: [&str; 6] = [
    "declined",
    "signing_declined",
    "user_declined",
    "xaman_declined",
    "cancelled",
    "canceled",
];

const TIMEOUT_ENGINE_RESULTS: [&str; 5] = [
    "timeout",
    "timed_out",
    "confirmation_timeout",
    "ledger_timeout",
    "tx_timeout",
];

/// Fold a validator rejection into a stable failure code.
///
/// Declined and timeout engine results take precedence regardless of which
/// invariant tripped; unvalidated confirmations are treated as the timeout
/// class when the observer itself reports `validated=false`.
pub fn classify_confirmation_failure(
    validation_error: LedgerValidationError,
    validated: bool,
    engine_result: &str,
) -> FailureCode {
    let normalized = engine_result.trim().to_lowercase();
    if DECLINED_ENGINE_RESULTS.contains(&normalized.as_str()) || normalized.contains("declined") {
        return FailureCode::SigningDeclined;
    }
    if TIMEOUT_ENGINE_RESULTS.contains(&normalized.as_str()) || normalized.contains("timeout") {
        return FailureCode::ConfirmationTimeout;
    }

    if validation_error == LedgerValidationError::LedgerTxNotSuccess {
        if normalized.starts_with("tec") || normalized.starts_with("tem") {
            return FailureCode::LedgerTecTem;
        }
        return FailureCode::LedgerNotSuccess;
    }

    if validation_error == LedgerValidationError::LedgerTxNotValidated {
        return if validated {
            FailureCode::LedgerNotValidated
        } else {
            FailureCode::ConfirmationTimeout
        };
    }

    FailureCode::InvalidConfirmation
}

/// Machine-parseable reason string stored next to the failure code.
pub fn build_failure_reason(
    validation_error: LedgerValidationError,
    validated: bool,
    engine_result: &str,
) -> String {
    format!(
        "validation_error={};validated={};engine_result={}",
        validation_error,
        validated,
        engine_result.trim()
    )
}
