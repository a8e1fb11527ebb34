//! The promoter's signing journey: auth, sign-request prepare, reconciliation.

mod common;

use ringledger::api;
use ringledger::api::schemas::{LoginRequest, RegisterRequest, SigningReconcileRequest};
use ringledger::config::Settings;
use ringledger::models::{EscrowKind, EscrowStatus, UserRole};
use ringledger::store::{MemoryStore, Store};
use ringledger::xaman::XamanClient;

use common::{confirm_all_escrows, planned_bout, BoutFixture};

fn stub_xaman() -> XamanClient {
    XamanClient::from_settings(&Settings::for_tests()).unwrap()
}

fn reconcile_request(
    kind: EscrowKind,
    payload_id: &str,
    observed_status: Option<&str>,
    observed_tx_hash: Option<&str>,
) -> SigningReconcileRequest {
    SigningReconcileRequest {
        escrow_kind: kind,
        payload_id: payload_id.to_string(),
        observed_status: observed_status.map(str::to_string),
        observed_tx_hash: observed_tx_hash.map(str::to_string),
    }
}

#[test]
fn register_login_and_authenticate_round_trip() {
    let store = MemoryStore::new();
    let settings = Settings::for_tests();

    let registered = api::register(
        &store,
        &RegisterRequest {
            email: "Promoter@Example.TEST".to_string(),
            password: "s3cret-pass".to_string(),
            role: UserRole::Promoter,
        },
    )
    .unwrap();
    assert_eq!(registered.email, "promoter@example.test");
    assert_eq!(registered.role, UserRole::Promoter);

    let duplicate = api::register(
        &store,
        &RegisterRequest {
            email: "promoter@example.test".to_string(),
            password: "s3cret-pass".to_string(),
            role: UserRole::Promoter,
        },
    )
    .err()
    .unwrap();
    assert_eq!(duplicate.status, 409);

    let token = api::login(
        &store,
        &settings,
        &LoginRequest {
            email: "promoter@example.test".to_string(),
            password: "s3cret-pass".to_string(),
        },
    )
    .unwrap();
    assert_eq!(token.token_type, "bearer");

    let actor = api::authenticate(
        &settings,
        Some(&format!("Bearer {}", token.access_token)),
    )
    .unwrap();
    assert_eq!(actor.role, UserRole::Promoter);
    assert_eq!(actor.email, "promoter@example.test");

    let bad_login = api::login(
        &store,
        &settings,
        &LoginRequest {
            email: "promoter@example.test".to_string(),
            password: "wrong-pass".to_string(),
        },
    )
    .err()
    .unwrap();
    assert_eq!(bad_login.status, 401);
}

#[tokio::test]
async fn prepare_returns_deterministic_sign_requests_for_all_escrows() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let prepared = api::prepare_escrows(&fixture.store, &xaman, &fixture.promoter, fixture.bout_id)
        .await
        .unwrap();
    assert_eq!(prepared.bout_id, fixture.bout_id.to_string());
    assert_eq!(prepared.escrows.len(), 4);
    for item in &prepared.escrows {
        assert_eq!(item.unsigned_tx["TransactionType"], "EscrowCreate");
        let sign_request = &item.xaman_sign_request;
        assert!(sign_request.deep_link_url.starts_with("xumm://payload/"));
        assert!(sign_request.qr_png_url.starts_with("https://xumm.app/sign/"));
        assert_eq!(sign_request.mode, "stub");
    }

    // Re-preparing yields the same payload ids: the stub derivation is pure.
    let again = api::prepare_escrows(&fixture.store, &xaman, &fixture.promoter, fixture.bout_id)
        .await
        .unwrap();
    let ids = |response: &ringledger::api::schemas::EscrowPrepareResponse| {
        response
            .escrows
            .iter()
            .map(|item| item.xaman_sign_request.payload_id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&prepared), ids(&again));
}

#[tokio::test]
async fn open_observation_reconciles_without_mutation() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let response = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(EscrowKind::ShowA, "payload-open-1", Some("open"), None),
    )
    .await
    .unwrap();
    assert_eq!(response.signing_status, "open");
    assert_eq!(response.failure_code, None);
    assert_eq!(response.escrow_status, EscrowStatus::Planned);

    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::ShowA)
        .unwrap();
    assert!(escrow.failure_code.is_none());
    let audit = fixture.store.list_audit_for_entity(&escrow.id.to_string());
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].outcome.to_string(), "pending");
    assert_eq!(audit[0].action, "escrow_signing_reconcile");
}

#[tokio::test]
async fn declined_then_signed_recovers_without_state_transition() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let declined = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(EscrowKind::ShowB, "payload-sb-1", Some("declined"), None),
    )
    .await
    .unwrap();
    assert_eq!(declined.signing_status, "declined");
    assert_eq!(declined.failure_code.as_deref(), Some("signing_declined"));
    assert_eq!(declined.escrow_status, EscrowStatus::Planned);

    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::ShowB)
        .unwrap();
    assert_eq!(escrow.failure_code.as_deref(), Some("signing_declined"));
    assert_eq!(
        escrow.failure_reason.as_deref(),
        Some("payload_id=payload-sb-1;signing_status=declined;tx_hash=none")
    );

    let signed = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(
            EscrowKind::ShowB,
            "payload-sb-1",
            Some("signed"),
            Some("TXSIGNED01"),
        ),
    )
    .await
    .unwrap();
    assert_eq!(signed.signing_status, "signed");
    assert_eq!(signed.failure_code, None);
    assert_eq!(signed.tx_hash.as_deref(), Some("TXSIGNED01"));
    assert_eq!(signed.escrow_status, EscrowStatus::Planned);

    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::ShowB)
        .unwrap();
    assert!(escrow.failure_code.is_none());
    assert!(escrow.failure_reason.is_none());
}

#[tokio::test]
async fn expired_payout_payload_is_stamped_but_escrow_unmoved() {
    let fixture = planned_bout();
    confirm_all_escrows(&fixture);
    let xaman = stub_xaman();

    let expired = api::reconcile_payout_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(EscrowKind::ShowB, "payload-exp-1", Some("expired"), None),
    )
    .await
    .unwrap();
    assert_eq!(expired.signing_status, "expired");
    assert_eq!(expired.failure_code.as_deref(), Some("signing_expired"));
    assert_eq!(expired.escrow_status, EscrowStatus::Created);

    let audit_action_of = |fixture: &BoutFixture| {
        let escrow = fixture
            .store
            .get_escrow(fixture.bout_id, EscrowKind::ShowB)
            .unwrap();
        fixture
            .store
            .list_audit_for_entity(&escrow.id.to_string())
            .into_iter()
            .filter(|entry| entry.action == "payout_signing_reconcile")
            .count()
    };
    assert_eq!(audit_action_of(&fixture), 1);
}

#[tokio::test]
async fn signed_observation_without_prior_failure_is_a_no_op() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let signed = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(
            EscrowKind::BonusA,
            "payload-ba-1",
            Some("signed"),
            Some("TXSIGNED02"),
        ),
    )
    .await
    .unwrap();
    assert_eq!(signed.signing_status, "signed");
    assert_eq!(signed.failure_code, None);
}

#[tokio::test]
async fn unknown_observation_audits_as_unknown() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let response = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(EscrowKind::ShowA, "payload-unk-1", None, None),
    )
    .await
    .unwrap();
    assert_eq!(response.signing_status, "unknown");

    let escrow = fixture
        .store
        .get_escrow(fixture.bout_id, EscrowKind::ShowA)
        .unwrap();
    let audit = fixture.store.list_audit_for_entity(&escrow.id.to_string());
    assert_eq!(audit[0].outcome.to_string(), "unknown");
}

#[tokio::test]
async fn invalid_observed_status_is_a_bad_request() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let error = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        fixture.bout_id,
        &reconcile_request(EscrowKind::ShowA, "payload-bad-1", Some("sideways"), None),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(error.status, 400);
    assert_eq!(error.detail, "Observed signing status is invalid.");
}

#[tokio::test]
async fn reconcile_unknown_escrow_is_not_found() {
    let fixture = planned_bout();
    let xaman = stub_xaman();

    let error = api::reconcile_escrow_signing(
        &fixture.store,
        &xaman,
        &fixture.promoter,
        uuid::Uuid::new_v4(),
        &reconcile_request(EscrowKind::ShowA, "payload-miss-1", Some("open"), None),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(error.status, 404);
}

#[test]
fn healthz_reports_ok() {
    assert_eq!(api::healthz(), serde_json::json!({"status": "ok"}));
}
