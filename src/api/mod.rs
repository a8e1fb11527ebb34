//! Typed transport boundary.
//!
//! The HTTP server itself is an external collaborator; these operations are
//! what its route handlers call. Each takes an authenticated actor, applies
//! the role gate, runs the service, and maps typed failures onto the status
//! codes and detail sentences clients see. The confirm operations additionally
//! run inside the idempotency protocol.

pub mod confirm_flow;
pub mod error_map;
pub mod guards;
pub mod schemas;

pub use confirm_flow::ApiReply;
pub use guards::{authenticate, require_role, RequestActor};

use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{authenticate_user, issue_access_token, register_user, AuthError};
use crate::config::Settings;
use crate::confirmation::{EscrowCreateConfirmation, EscrowPayoutConfirmation};
use crate::models::UserRole;
use crate::services::{
    EscrowService, PayoutService, SigningReconciliation, SigningReconciliationOutcome,
};
use crate::store::Store;
use crate::xaman::XamanClient;

use self::confirm_flow::ConfirmFlow;
use self::error_map::{
    map_escrow_create_confirm_error, map_escrow_prepare_error, map_payout_confirm_error,
    map_payout_prepare_error, map_result_error, map_signing_reconcile_error,
};
use self::schemas::{
    BoutResultRequest, BoutResultResponse, EscrowConfirmRequest, EscrowConfirmResponse,
    EscrowPrepareItem, EscrowPrepareResponse, LoginRequest, PayoutConfirmRequest,
    PayoutConfirmResponse, PayoutPrepareItem, PayoutPrepareResponse, RegisterRequest,
    RegisterResponse, SigningReconcileRequest, SigningReconcileResponse, TokenResponse,
};

/// A transport failure: the status code and the human detail sentence the
/// adapter renders as `{"detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.detail)
    }
}

impl std::error::Error for ApiError {}

/// Liveness probe body.
pub fn healthz() -> Value {
    json!({"status": "ok"})
}

/// POST /auth/register, 201 on success.
pub fn register(store: &dyn Store, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
    let user = register_user(store, &request.email, &request.password, request.role).map_err(
        |error| match error {
            AuthError::EmailAlreadyExists => {
                ApiError::new(409, "A user with this email already exists.")
            }
            AuthError::PasswordTooShort => ApiError::new(400, "Registration request is invalid."),
            _ => ApiError::new(409, "Could not create account."),
        },
    )?;
    Ok(RegisterResponse {
        user_id: user.id.to_string(),
        email: user.email,
        role: user.role,
    })
}

/// POST /auth/login.
pub fn login(
    store: &dyn Store,
    settings: &Settings,
    request: &LoginRequest,
) -> Result<TokenResponse, ApiError> {
    let user = authenticate_user(store, &request.email, &request.password)
        .ok_or_else(|| ApiError::new(401, "Invalid credentials."))?;
    Ok(TokenResponse {
        access_token: issue_access_token(settings, &user),
        token_type: "bearer".to_string(),
    })
}

/// POST /bouts/{id}/escrows/prepare; promoter only.
pub async fn prepare_escrows(
    store: &dyn Store,
    xaman: &XamanClient,
    actor: &RequestActor,
    bout_id: Uuid,
) -> Result<EscrowPrepareResponse, ApiError> {
    require_role(actor, UserRole::Promoter)?;
    let (bout, records) = EscrowService::new(store)
        .prepare_escrow_create_payloads(bout_id)
        .map_err(map_escrow_prepare_error)?;

    let mut escrows = Vec::with_capacity(records.len());
    for record in records {
        let reference = format!("escrow_create_prepare:{}:{}", bout.id, record.escrow_id);
        let sign_request = xaman
            .create_sign_request(&record.unsigned_tx, &reference)
            .await
            .map_err(|_| ApiError::new(502, "Xaman signing request could not be prepared."))?;
        escrows.push(EscrowPrepareItem {
            escrow_id: record.escrow_id.to_string(),
            escrow_kind: record.escrow_kind,
            unsigned_tx: record.unsigned_tx,
            xaman_sign_request: sign_request.into(),
        });
    }
    Ok(EscrowPrepareResponse {
        bout_id: bout.id.to_string(),
        escrows,
    })
}

/// POST /bouts/{id}/escrows/confirm; promoter only, idempotent.
pub fn confirm_escrow(
    store: &dyn Store,
    actor: &RequestActor,
    bout_id: Uuid,
    idempotency_key: Option<&str>,
    request: &EscrowConfirmRequest,
) -> Result<ApiReply, ApiError> {
    require_role(actor, UserRole::Promoter)?;
    let payload = serde_json::to_value(request)
        .map_err(|_| ApiError::new(400, "Escrow confirmation request is invalid."))?;
    let (flow, replay) =
        ConfirmFlow::prepare(store, "escrow_create_confirm", bout_id, idempotency_key, &payload)?;
    if let Some(reply) = replay {
        return Ok(reply);
    }

    let confirmation = EscrowCreateConfirmation {
        tx_hash: request.tx_hash.clone(),
        offer_sequence: request.offer_sequence,
        validated: request.validated,
        engine_result: request.engine_result.clone(),
        owner_address: request.owner_address.clone(),
        destination_address: request.destination_address.clone(),
        amount_drops: request.amount_drops,
        finish_after_ripple: request.finish_after_ripple,
        cancel_after_ripple: request.cancel_after_ripple,
        condition_hex: request.condition_hex.clone(),
    };

    match EscrowService::new(store).confirm_escrow_create(bout_id, request.escrow_kind, &confirmation)
    {
        Ok((bout, escrow)) => {
            let response = EscrowConfirmResponse {
                bout_id: bout.id.to_string(),
                escrow_id: escrow.id.to_string(),
                escrow_kind: escrow.kind,
                escrow_status: escrow.status,
                bout_status: bout.status,
                tx_hash: escrow.create_tx_hash.unwrap_or_default(),
                offer_sequence: escrow.offer_sequence.unwrap_or_default(),
            };
            let body = serde_json::to_value(&response)
                .map_err(|_| persistence_error("Escrow confirmation"))?;
            flow.finish(200, body, "Escrow confirmation could not be persisted safely.")
        }
        Err(error) => {
            let (status, detail) = map_escrow_create_confirm_error(&error);
            flow.finish(
                status,
                json!({"detail": detail}),
                "Escrow confirmation could not be persisted safely.",
            )
        }
    }
}

/// POST /bouts/{id}/result; admin only.
pub fn enter_result(
    store: &dyn Store,
    actor: &RequestActor,
    bout_id: Uuid,
    request: &BoutResultRequest,
) -> Result<BoutResultResponse, ApiError> {
    require_role(actor, UserRole::Admin)?;
    let bout = PayoutService::new(store)
        .enter_bout_result(bout_id, request.winner, actor.user_id)
        .map_err(map_result_error)?;
    Ok(BoutResultResponse {
        bout_id: bout.id.to_string(),
        bout_status: bout.status,
        winner: bout.winner.unwrap_or(request.winner),
    })
}

/// POST /bouts/{id}/payouts/prepare; promoter only.
pub async fn prepare_payouts(
    store: &dyn Store,
    xaman: &XamanClient,
    actor: &RequestActor,
    bout_id: Uuid,
) -> Result<PayoutPrepareResponse, ApiError> {
    require_role(actor, UserRole::Promoter)?;
    let (bout, records) = PayoutService::new(store)
        .prepare_payout_payloads(bout_id)
        .map_err(map_payout_prepare_error)?;

    let mut escrows = Vec::with_capacity(records.len());
    for record in records {
        let reference = format!(
            "payout_prepare:{}:{}:{}",
            bout.id, record.escrow_id, record.action
        );
        let sign_request = xaman
            .create_sign_request(&record.unsigned_tx, &reference)
            .await
            .map_err(|_| ApiError::new(502, "Xaman signing request could not be prepared."))?;
        escrows.push(PayoutPrepareItem {
            escrow_id: record.escrow_id.to_string(),
            escrow_kind: record.escrow_kind,
            action: record.action,
            unsigned_tx: record.unsigned_tx,
            xaman_sign_request: sign_request.into(),
        });
    }
    Ok(PayoutPrepareResponse {
        bout_id: bout.id.to_string(),
        bout_status: bout.status,
        escrows,
    })
}

/// POST /bouts/{id}/payouts/confirm; promoter only, idempotent.
pub fn confirm_payout(
    store: &dyn Store,
    actor: &RequestActor,
    bout_id: Uuid,
    idempotency_key: Option<&str>,
    request: &PayoutConfirmRequest,
) -> Result<ApiReply, ApiError> {
    require_role(actor, UserRole::Promoter)?;
    let payload = serde_json::to_value(request)
        .map_err(|_| ApiError::new(400, "Payout confirmation request is invalid."))?;
    let (flow, replay) =
        ConfirmFlow::prepare(store, "payout_confirm", bout_id, idempotency_key, &payload)?;
    if let Some(reply) = replay {
        return Ok(reply);
    }

    let confirmation = EscrowPayoutConfirmation {
        tx_hash: request.tx_hash.clone(),
        validated: request.validated,
        engine_result: request.engine_result.clone(),
        transaction_type: request.transaction_type.clone(),
        owner_address: request.owner_address.clone(),
        offer_sequence: request.offer_sequence,
        close_time_ripple: request.close_time_ripple,
        fulfillment_hex: request.fulfillment_hex.clone(),
    };

    match PayoutService::new(store).confirm_payout(bout_id, request.escrow_kind, &confirmation) {
        Ok((bout, escrow)) => {
            let response = PayoutConfirmResponse {
                bout_id: bout.id.to_string(),
                escrow_id: escrow.id.to_string(),
                escrow_kind: escrow.kind,
                escrow_status: escrow.status,
                bout_status: bout.status,
                tx_hash: escrow.close_tx_hash.unwrap_or_default(),
            };
            let body = serde_json::to_value(&response)
                .map_err(|_| persistence_error("Payout confirmation"))?;
            flow.finish(200, body, "Payout confirmation could not be persisted safely.")
        }
        Err(error) => {
            let (status, detail) = map_payout_confirm_error(&error);
            flow.finish(
                status,
                json!({"detail": detail}),
                "Payout confirmation could not be persisted safely.",
            )
        }
    }
}

/// POST /bouts/{id}/escrows/signing/reconcile; promoter only.
pub async fn reconcile_escrow_signing(
    store: &dyn Store,
    xaman: &XamanClient,
    actor: &RequestActor,
    bout_id: Uuid,
    request: &SigningReconcileRequest,
) -> Result<SigningReconcileResponse, ApiError> {
    require_role(actor, UserRole::Promoter)?;
    let outcome = SigningReconciliation::new(store, xaman)
        .reconcile_escrow_create_signing(
            bout_id,
            request.escrow_kind,
            &request.payload_id,
            actor.user_id,
            request.observed_status.as_deref(),
            request.observed_tx_hash.as_deref(),
        )
        .await
        .map_err(|error| map_signing_reconcile_error(&error))?;
    Ok(reconcile_response(outcome))
}

/// POST /bouts/{id}/payouts/signing/reconcile; promoter only.
pub async fn reconcile_payout_signing(
    store: &dyn Store,
    xaman: &XamanClient,
    actor: &RequestActor,
    bout_id: Uuid,
    request: &SigningReconcileRequest,
) -> Result<SigningReconcileResponse, ApiError> {
    require_role(actor, UserRole::Promoter)?;
    let outcome = SigningReconciliation::new(store, xaman)
        .reconcile_payout_signing(
            bout_id,
            request.escrow_kind,
            &request.payload_id,
            actor.user_id,
            request.observed_status.as_deref(),
            request.observed_tx_hash.as_deref(),
        )
        .await
        .map_err(|error| map_signing_reconcile_error(&error))?;
    Ok(reconcile_response(outcome))
}

fn reconcile_response(outcome: SigningReconciliationOutcome) -> SigningReconcileResponse {
    SigningReconcileResponse {
        bout_id: outcome.bout.id.to_string(),
        escrow_id: outcome.escrow.id.to_string(),
        escrow_kind: outcome.escrow.kind,
        escrow_status: outcome.escrow.status,
        payload_id: outcome.payload_id,
        signing_status: outcome.signing_status.to_string(),
        tx_hash: outcome.tx_hash,
        failure_code: outcome.escrow.failure_code,
    }
}

fn persistence_error(operation: &str) -> ApiError {
    ApiError::new(409, format!("{operation} could not be persisted safely."))
}
