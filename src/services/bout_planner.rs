//! Materialization of a draft bout with its four planned escrows.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::conditions::{generate_preimage_hex, make_condition_hex, make_fulfillment_hex};
use crate::models::{Bout, BoutStatus, Escrow, EscrowKind, EscrowStatus};
use crate::services::FlowError;
use crate::store::{Store, StoreError};
use crate::utils::hex_conversion::HexError;
use crate::utils::time_conversion::{
    compute_bonus_cancel_after, compute_finish_after, to_ripple_epoch, TimeError,
};
use crate::utils::xrp_conversion::{ensure_valid_drops, MoneyError};

/// Everything the promoter supplies to plan a bout.
#[derive(Debug, Clone)]
pub struct CreateBoutDraft {
    pub promoter_user_id: Uuid,
    pub fighter_a_user_id: Uuid,
    pub fighter_b_user_id: Uuid,
    pub event_datetime_utc: DateTime<Utc>,
    pub promoter_owner_address: String,
    pub fighter_a_destination: String,
    pub fighter_b_destination: String,
    pub show_a_drops: i64,
    pub show_b_drops: i64,
    pub bonus_a_drops: i64,
    pub bonus_b_drops: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Hex(#[from] HexError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Plans draft bouts. The four escrows are inserted atomically with the bout;
/// bonus purses get a preimage, condition, and the seven-day reclaim window.
pub struct BoutPlanner<'a> {
    store: &'a dyn Store,
}

impl<'a> BoutPlanner<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub fn create_bout_draft(&self, draft: CreateBoutDraft) -> Result<Bout, PlanError> {
        if draft.fighter_a_user_id == draft.fighter_b_user_id {
            return Err(FlowError::BoutFightersMustDiffer.into());
        }
        for amount in [
            draft.show_a_drops,
            draft.show_b_drops,
            draft.bonus_a_drops,
            draft.bonus_b_drops,
        ] {
            ensure_valid_drops(amount)?;
        }

        let finish_after = compute_finish_after(draft.event_datetime_utc);
        let cancel_after = compute_bonus_cancel_after(draft.event_datetime_utc);
        let finish_after_ripple = to_ripple_epoch(finish_after)?;
        let cancel_after_ripple = to_ripple_epoch(cancel_after)?;

        let bonus_a_fulfillment = make_fulfillment_hex(&generate_preimage_hex())?;
        let bonus_b_fulfillment = make_fulfillment_hex(&generate_preimage_hex())?;
        let bonus_a_condition = make_condition_hex(&bonus_a_fulfillment)?;
        let bonus_b_condition = make_condition_hex(&bonus_b_fulfillment)?;

        let bout = Bout {
            id: Uuid::new_v4(),
            promoter_user_id: draft.promoter_user_id,
            fighter_a_user_id: draft.fighter_a_user_id,
            fighter_b_user_id: draft.fighter_b_user_id,
            event_datetime_utc: draft.event_datetime_utc,
            finish_after_utc: finish_after,
            cancel_after_utc: cancel_after,
            show_a_drops: draft.show_a_drops,
            show_b_drops: draft.show_b_drops,
            bonus_a_drops: draft.bonus_a_drops,
            bonus_b_drops: draft.bonus_b_drops,
            status: BoutStatus::Draft,
            winner: None,
            created_at: Utc::now(),
        };
        self.store.insert_bout(bout.clone())?;

        let plans = [
            (EscrowKind::ShowA, &draft.fighter_a_destination, draft.show_a_drops, None, None),
            (EscrowKind::ShowB, &draft.fighter_b_destination, draft.show_b_drops, None, None),
            (
                EscrowKind::BonusA,
                &draft.fighter_a_destination,
                draft.bonus_a_drops,
                Some(bonus_a_condition),
                Some(bonus_a_fulfillment),
            ),
            (
                EscrowKind::BonusB,
                &draft.fighter_b_destination,
                draft.bonus_b_drops,
                Some(bonus_b_condition),
                Some(bonus_b_fulfillment),
            ),
        ];
        for (kind, destination, amount_drops, condition_hex, encrypted_preimage_hex) in plans {
            self.store.insert_escrow(Escrow {
                id: Uuid::new_v4(),
                bout_id: bout.id,
                kind,
                status: EscrowStatus::Planned,
                owner_address: draft.promoter_owner_address.clone(),
                destination_address: destination.clone(),
                amount_drops,
                finish_after_ripple,
                cancel_after_ripple: kind.is_bonus().then_some(cancel_after_ripple),
                condition_hex,
                encrypted_preimage_hex,
                offer_sequence: None,
                create_tx_hash: None,
                close_tx_hash: None,
                failure_code: None,
                failure_reason: None,
                created_at: Utc::now(),
            })?;
        }

        tracing::info!(bout_id = %bout.id, "bout draft planned with four escrows");
        Ok(bout)
    }
}
