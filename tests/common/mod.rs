#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use ringledger::api::schemas::{EscrowConfirmRequest, PayoutConfirmRequest};
use ringledger::api::{self, RequestActor};
use ringledger::models::{EscrowKind, UserRole};
use ringledger::services::{BoutPlanner, CreateBoutDraft};
use ringledger::store::{MemoryStore, Store};

pub const SHOW_A_DROPS: i64 = 2_000_000;
pub const SHOW_B_DROPS: i64 = 2_100_000;
pub const BONUS_DROPS: i64 = 300_000;

pub fn event_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 18, 20, 0, 0).unwrap()
}

pub fn actor(role: UserRole) -> RequestActor {
    RequestActor {
        user_id: Uuid::new_v4(),
        email: format!("{role}@example.test"),
        role,
    }
}

pub struct BoutFixture {
    pub store: MemoryStore,
    pub bout_id: Uuid,
    pub promoter: RequestActor,
    pub admin: RequestActor,
}

/// A planned bout with four PLANNED escrows and freshly minted actors.
pub fn planned_bout() -> BoutFixture {
    let store = MemoryStore::new();
    let promoter = actor(UserRole::Promoter);
    let bout = BoutPlanner::new(&store)
        .create_bout_draft(CreateBoutDraft {
            promoter_user_id: promoter.user_id,
            fighter_a_user_id: Uuid::new_v4(),
            fighter_b_user_id: Uuid::new_v4(),
            event_datetime_utc: event_datetime(),
            promoter_owner_address: "rPromoterOwner".to_string(),
            fighter_a_destination: "rFighterADest".to_string(),
            fighter_b_destination: "rFighterBDest".to_string(),
            show_a_drops: SHOW_A_DROPS,
            show_b_drops: SHOW_B_DROPS,
            bonus_a_drops: BONUS_DROPS,
            bonus_b_drops: BONUS_DROPS,
        })
        .expect("bout draft plans cleanly");
    BoutFixture {
        store,
        bout_id: bout.id,
        promoter,
        admin: actor(UserRole::Admin),
    }
}

/// An EscrowCreate observation mirroring the recorded plan exactly.
pub fn matching_create_confirmation(
    store: &MemoryStore,
    bout_id: Uuid,
    kind: EscrowKind,
    tx_hash: &str,
    offer_sequence: u32,
) -> EscrowConfirmRequest {
    let escrow = store.get_escrow(bout_id, kind).expect("escrow exists");
    EscrowConfirmRequest {
        escrow_kind: kind,
        tx_hash: tx_hash.to_string(),
        offer_sequence,
        validated: true,
        engine_result: "tesSUCCESS".to_string(),
        owner_address: escrow.owner_address,
        destination_address: escrow.destination_address,
        amount_drops: escrow.amount_drops,
        finish_after_ripple: escrow.finish_after_ripple,
        cancel_after_ripple: escrow.cancel_after_ripple,
        condition_hex: escrow.condition_hex,
    }
}

/// A finish/cancel observation mirroring the recorded escrow.
pub fn matching_payout_confirmation(
    store: &MemoryStore,
    bout_id: Uuid,
    kind: EscrowKind,
    tx_hash: &str,
    transaction_type: &str,
    close_time_ripple: i64,
    fulfillment_hex: Option<String>,
) -> PayoutConfirmRequest {
    let escrow = store.get_escrow(bout_id, kind).expect("escrow exists");
    PayoutConfirmRequest {
        escrow_kind: kind,
        tx_hash: tx_hash.to_string(),
        validated: true,
        engine_result: "tesSUCCESS".to_string(),
        transaction_type: transaction_type.to_string(),
        owner_address: escrow.owner_address,
        offer_sequence: escrow.offer_sequence.expect("escrow was created"),
        close_time_ripple,
        fulfillment_hex,
    }
}

/// Confirm all four EscrowCreate observations, promoting the bout.
pub fn confirm_all_escrows(fixture: &BoutFixture) {
    for (index, kind) in EscrowKind::ALL.into_iter().enumerate() {
        let request = matching_create_confirmation(
            &fixture.store,
            fixture.bout_id,
            kind,
            &format!("TXCREATE{:04}", index + 1),
            9_001 + index as u32,
        );
        let reply = api::confirm_escrow(
            &fixture.store,
            &fixture.promoter,
            fixture.bout_id,
            Some(&format!("seed-escrow-{kind}")),
            &request,
        )
        .expect("confirm request is well-formed");
        assert_eq!(reply.status, 200, "escrow {kind} should confirm");
    }
}
