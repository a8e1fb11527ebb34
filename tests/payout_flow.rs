//! Result entry, payout planning, and closure of a bout.

mod common;

use ringledger::api;
use ringledger::api::schemas::BoutResultRequest;
use ringledger::config::Settings;
use ringledger::models::{BoutStatus, BoutWinner, EscrowKind, EscrowStatus};
use ringledger::store::Store;
use ringledger::xaman::XamanClient;

use common::{
    actor, confirm_all_escrows, matching_payout_confirmation, planned_bout, BoutFixture,
};

fn bout_with_result(winner: BoutWinner) -> BoutFixture {
    let fixture = planned_bout();
    confirm_all_escrows(&fixture);
    let response = api::enter_result(
        &fixture.store,
        &fixture.admin,
        fixture.bout_id,
        &BoutResultRequest { winner },
    )
    .unwrap();
    assert_eq!(response.bout_status, BoutStatus::ResultEntered);
    assert_eq!(response.winner, winner);
    fixture
}

fn finish_time(fixture: &BoutFixture) -> i64 {
    fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::ShowA)
        .unwrap()
        .finish_after_ripple
        + 60
}

fn confirm_finish(fixture: &BoutFixture, kind: EscrowKind, tx_hash: &str, key: &str) -> u16 {
    let fulfillment = if kind.is_bonus() {
        fixture
            .store
            .get_escrow(fixture.bout_id, kind)
            .unwrap()
            .encrypted_preimage_hex
    } else {
        None
    };
    let request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        kind,
        tx_hash,
        "EscrowFinish",
        finish_time(fixture),
        fulfillment,
    );
    api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some(key),
        &request,
    )
    .unwrap()
    .status
}

#[test]
fn happy_path_closes_the_bout_with_loser_bonus_still_created() {
    let fixture = bout_with_result(BoutWinner::A);

    assert_eq!(
        confirm_finish(&fixture, EscrowKind::ShowA, "TXPAYOUT0001", "payout-show-a"),
        200
    );
    assert_eq!(
        fixture.store.get_bout(fixture.bout_id).unwrap().status,
        BoutStatus::PayoutsInProgress
    );
    assert_eq!(
        confirm_finish(&fixture, EscrowKind::ShowB, "TXPAYOUT0002", "payout-show-b"),
        200
    );
    assert_eq!(
        confirm_finish(&fixture, EscrowKind::BonusA, "TXPAYOUT0003", "payout-bonus-a"),
        200
    );

    let bout = fixture.store.get_bout(fixture.bout_id).unwrap();
    assert_eq!(bout.status, BoutStatus::Closed);

    let status_of = |kind: EscrowKind| {
        fixture
            .store
            .get_escrow(fixture.bout_id, kind)
            .unwrap()
            .status
    };
    assert_eq!(status_of(EscrowKind::ShowA), EscrowStatus::Finished);
    assert_eq!(status_of(EscrowKind::ShowB), EscrowStatus::Finished);
    assert_eq!(status_of(EscrowKind::BonusA), EscrowStatus::Finished);
    assert_eq!(status_of(EscrowKind::BonusB), EscrowStatus::Created);

    let bout_audit = fixture.store.list_audit_for_entity(&bout.id.to_string());
    assert!(bout_audit.iter().any(|entry| entry.action == "bout_closed"));
}

#[tokio::test]
async fn payout_plan_is_deterministic_and_skips_settled_escrows() {
    let fixture = bout_with_result(BoutWinner::A);
    let xaman = XamanClient::from_settings(&Settings::for_tests()).unwrap();

    let prepared = api::prepare_payouts(&fixture.store, &xaman, &fixture.promoter, fixture.bout_id)
        .await
        .unwrap();
    assert_eq!(prepared.bout_status, BoutStatus::ResultEntered);
    let plan: Vec<(EscrowKind, String)> = prepared
        .escrows
        .iter()
        .map(|item| (item.escrow_kind, item.action.to_string()))
        .collect();
    assert_eq!(
        plan,
        vec![
            (EscrowKind::ShowA, "finish".to_string()),
            (EscrowKind::ShowB, "finish".to_string()),
            (EscrowKind::BonusA, "finish".to_string()),
            (EscrowKind::BonusB, "cancel".to_string()),
        ]
    );
    let winner_bonus = prepared
        .escrows
        .iter()
        .find(|item| item.escrow_kind == EscrowKind::BonusA)
        .unwrap();
    assert!(winner_bonus.unsigned_tx.get("Fulfillment").is_some());
    let loser_bonus = prepared
        .escrows
        .iter()
        .find(|item| item.escrow_kind == EscrowKind::BonusB)
        .unwrap();
    assert_eq!(loser_bonus.unsigned_tx["TransactionType"], "EscrowCancel");

    confirm_finish(&fixture, EscrowKind::ShowA, "TXPAYOUT0001", "payout-show-a");
    let reprepared =
        api::prepare_payouts(&fixture.store, &xaman, &fixture.promoter, fixture.bout_id)
            .await
            .unwrap();
    assert_eq!(reprepared.bout_status, BoutStatus::PayoutsInProgress);
    assert_eq!(reprepared.escrows.len(), 3, "finished escrow is skipped");
}

#[test]
fn loser_bonus_cancel_before_cancel_after_is_rejected() {
    let fixture = bout_with_result(BoutWinner::A);
    let cancel_after = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::BonusB)
        .unwrap()
        .cancel_after_ripple
        .unwrap();

    let request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        EscrowKind::BonusB,
        "TXCANCEL0001",
        "EscrowCancel",
        cancel_after - 1,
        None,
    );
    let reply = api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some("payout-early-cancel"),
        &request,
    )
    .unwrap();
    assert_eq!(reply.status, 422);
    assert_eq!(reply.body["detail"], "Ledger confirmation failed validation.");

    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::BonusB)
        .unwrap();
    assert_eq!(escrow.status, EscrowStatus::Created);
    assert_eq!(escrow.failure_code.as_deref(), Some("invalid_confirmation"));
    assert!(escrow
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("ledger_cancel_before_allowed"));
}

#[test]
fn loser_bonus_cancel_after_window_succeeds() {
    let fixture = bout_with_result(BoutWinner::A);
    let cancel_after = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::BonusB)
        .unwrap()
        .cancel_after_ripple
        .unwrap();

    let request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        EscrowKind::BonusB,
        "TXCANCEL0002",
        "EscrowCancel",
        cancel_after,
        None,
    );
    let reply = api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some("payout-late-cancel"),
        &request,
    )
    .unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(
        fixture
            .store
            .get_escrow(fixture.bout_id, EscrowKind::BonusB)
            .unwrap()
            .status,
        EscrowStatus::Cancelled
    );
    // The cancel alone does not close the bout.
    assert_eq!(
        fixture.store.get_bout(fixture.bout_id).unwrap().status,
        BoutStatus::PayoutsInProgress
    );
}

#[test]
fn tec_tem_rejection_is_classified_and_leaves_escrow_created() {
    let fixture = bout_with_result(BoutWinner::A);
    let mut request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        EscrowKind::ShowA,
        "TXPAYOUT0009",
        "EscrowFinish",
        finish_time(&fixture),
        None,
    );
    request.engine_result = "temMALFORMED".to_string();

    let reply = api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some("payout-tem"),
        &request,
    )
    .unwrap();
    assert_eq!(reply.status, 422);
    assert_eq!(
        reply.body["detail"],
        "Ledger transaction was rejected with tec/tem; no state transition was applied."
    );

    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::ShowA)
        .unwrap();
    assert_eq!(escrow.status, EscrowStatus::Created);
    assert_eq!(escrow.failure_code.as_deref(), Some("ledger_tec_tem"));
    let audit = fixture.store.list_audit_for_entity(&escrow.id.to_string());
    let rejected: Vec<_> = audit
        .iter()
        .filter(|entry| entry.action == "escrow_payout_confirm")
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].outcome.to_string(), "rejected");
}

#[test]
fn winner_bonus_finish_without_fulfillment_is_rejected() {
    let fixture = bout_with_result(BoutWinner::B);
    let request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        EscrowKind::BonusB,
        "TXPAYOUT0010",
        "EscrowFinish",
        finish_time(&fixture),
        None,
    );
    let reply = api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some("payout-no-fulfillment"),
        &request,
    )
    .unwrap();
    assert_eq!(reply.status, 422);
    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::BonusB)
        .unwrap();
    assert!(escrow
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("ledger_fulfillment_mismatch"));
}

#[test]
fn result_entry_is_admin_gated_and_single_shot() {
    let fixture = planned_bout();
    confirm_all_escrows(&fixture);

    let error = api::enter_result(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        &BoutResultRequest {
            winner: BoutWinner::A,
        },
    )
    .err()
    .unwrap();
    assert_eq!(error.status, 403);

    api::enter_result(
        &fixture.store,
        &fixture.admin,
        fixture.bout_id,
        &BoutResultRequest {
            winner: BoutWinner::A,
        },
    )
    .unwrap();
    let error = api::enter_result(
        &fixture.store,
        &fixture.admin,
        fixture.bout_id,
        &BoutResultRequest {
            winner: BoutWinner::B,
        },
    )
    .err()
    .unwrap();
    assert_eq!(error.status, 409);
    assert_eq!(error.detail, "Bout result cannot be entered in current state.");
}

#[test]
fn result_entry_requires_created_escrows() {
    let fixture = planned_bout();
    let error = api::enter_result(
        &fixture.store,
        &fixture.admin,
        fixture.bout_id,
        &BoutResultRequest {
            winner: BoutWinner::A,
        },
    )
    .err()
    .unwrap();
    assert_eq!(error.status, 409);
}

#[test]
fn payout_confirm_on_settled_escrow_conflicts() {
    let fixture = bout_with_result(BoutWinner::A);
    confirm_finish(&fixture, EscrowKind::ShowA, "TXPAYOUT0001", "payout-show-a");

    // Retrying the already-finished escrow with a fresh key hits the
    // escrow_not_created guard.
    let request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        EscrowKind::ShowA,
        "TXPAYOUT0011",
        "EscrowFinish",
        finish_time(&fixture),
        None,
    );
    let reply = api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some("payout-show-a-again"),
        &request,
    )
    .unwrap();
    assert_eq!(reply.status, 409);
    assert_eq!(
        reply.body["detail"],
        "Payout confirmation is not allowed in current state."
    );
}

#[test]
fn payout_prepare_before_result_conflicts() {
    let fixture = planned_bout();
    confirm_all_escrows(&fixture);
    let request = matching_payout_confirmation(
        &fixture.store,
        fixture.bout_id,
        EscrowKind::ShowA,
        "TXPAYOUT0001",
        "EscrowFinish",
        finish_time(&fixture),
        None,
    );
    let reply = api::confirm_payout(
        &fixture.store,
        &fixture.promoter,
        fixture.bout_id,
        Some("payout-before-result"),
        &request,
    )
    .unwrap();
    assert_eq!(reply.status, 409);

    let role_error = api::confirm_payout(
        &fixture.store,
        &actor(ringledger::models::UserRole::Fighter),
        fixture.bout_id,
        Some("payout-role"),
        &request,
    )
    .err()
    .unwrap();
    assert_eq!(role_error.status, 403);
}
