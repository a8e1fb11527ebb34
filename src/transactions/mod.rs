//! Deterministic assembly of unsigned XRPL escrow transactions.
//!
//! The builders read a planned [`Escrow`] row and emit the exact payload the
//! signing wallet shows to the promoter. Field names are bit-exact XRPL
//! vocabulary; optional fields are omitted, never null.

pub mod escrow_cancel;
pub mod escrow_create;
pub mod escrow_finish;

pub use escrow_cancel::EscrowCancelTx;
pub use escrow_create::EscrowCreateTx;
pub use escrow_finish::EscrowFinishTx;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::models::Escrow;
use crate::utils::hex_conversion::normalize_optional_hex;

/// XRPL transaction types this system hands out for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TransactionType {
    EscrowCancel,
    EscrowCreate,
    EscrowFinish,
}

/// Exception for escrow rows that cannot be rendered into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TxBuildError {
    EscrowOfferSequenceMissing,
    FulfillmentHexInvalid,
}

impl std::error::Error for TxBuildError {}

/// Assemble the EscrowCreate payload for a planned escrow.
///
/// `CancelAfter` and `Condition` ride along exactly when the plan carries them
/// (bonus purses).
pub fn build_escrow_create_tx(escrow: &Escrow) -> EscrowCreateTx {
    EscrowCreateTx {
        transaction_type: TransactionType::EscrowCreate,
        account: escrow.owner_address.clone(),
        destination: escrow.destination_address.clone(),
        amount: escrow.amount_drops.to_string(),
        finish_after: escrow.finish_after_ripple,
        cancel_after: escrow.cancel_after_ripple,
        condition: escrow.condition_hex.clone(),
    }
}

/// Assemble the EscrowFinish payload for a created escrow.
///
/// Requires the `OfferSequence` recorded by the create confirmation; the
/// fulfillment rides along uppercase-normalized when the caller provides one.
pub fn build_escrow_finish_tx(
    escrow: &Escrow,
    fulfillment_hex: Option<&str>,
) -> Result<EscrowFinishTx, TxBuildError> {
    let offer_sequence = escrow
        .offer_sequence
        .ok_or(TxBuildError::EscrowOfferSequenceMissing)?;
    let fulfillment =
        normalize_optional_hex(fulfillment_hex).map_err(|_| TxBuildError::FulfillmentHexInvalid)?;
    Ok(EscrowFinishTx {
        transaction_type: TransactionType::EscrowFinish,
        account: escrow.owner_address.clone(),
        owner: escrow.owner_address.clone(),
        offer_sequence,
        fulfillment,
    })
}

/// Assemble the EscrowCancel payload for a created escrow.
pub fn build_escrow_cancel_tx(escrow: &Escrow) -> Result<EscrowCancelTx, TxBuildError> {
    let offer_sequence = escrow
        .offer_sequence
        .ok_or(TxBuildError::EscrowOfferSequenceMissing)?;
    Ok(EscrowCancelTx {
        transaction_type: TransactionType::EscrowCancel,
        account: escrow.owner_address.clone(),
        owner: escrow.owner_address.clone(),
        offer_sequence,
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::{Escrow, EscrowKind, EscrowStatus};

    pub fn planned_escrow(kind: EscrowKind, cancel_after_ripple: Option<i64>) -> Escrow {
        Escrow {
            id: Uuid::new_v4(),
            bout_id: Uuid::new_v4(),
            kind,
            status: EscrowStatus::Planned,
            owner_address: "rPromoter".to_string(),
            destination_address: "rFighter".to_string(),
            amount_drops: 250_000,
            finish_after_ripple: 800,
            cancel_after_ripple,
            condition_hex: None,
            encrypted_preimage_hex: None,
            offer_sequence: None,
            create_tx_hash: None,
            close_tx_hash: None,
            failure_code: None,
            failure_reason: None,
            created_at: Utc::now(),
        }
    }
}
