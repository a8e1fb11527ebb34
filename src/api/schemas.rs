//! Request and response bodies of the transport boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    BoutStatus, BoutWinner, EscrowCloseAction, EscrowKind, EscrowStatus, UserRole,
};
use crate::xaman::XamanSignRequest;

fn default_role() -> UserRole {
    UserRole::Fighter
}

/// Client-facing view of a created sign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XamanSignRequestView {
    pub payload_id: String,
    pub deep_link_url: String,
    pub qr_png_url: String,
    pub websocket_status_url: Option<String>,
    pub mode: String,
}

impl From<XamanSignRequest> for XamanSignRequestView {
    fn from(sign_request: XamanSignRequest) -> Self {
        Self {
            payload_id: sign_request.payload_id,
            deep_link_url: sign_request.deep_link_url,
            qr_png_url: sign_request.qr_png_url,
            websocket_status_url: sign_request.websocket_status_url,
            mode: sign_request.mode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowPrepareItem {
    pub escrow_id: String,
    pub escrow_kind: EscrowKind,
    pub unsigned_tx: Value,
    pub xaman_sign_request: XamanSignRequestView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowPrepareResponse {
    pub bout_id: String,
    pub escrows: Vec<EscrowPrepareItem>,
}

/// An observed EscrowCreate, exactly as the client saw it on the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfirmRequest {
    pub escrow_kind: EscrowKind,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfirmResponse {
    pub bout_id: String,
    pub escrow_id: String,
    pub escrow_kind: EscrowKind,
    pub escrow_status: EscrowStatus,
    pub bout_status: BoutStatus,
    pub tx_hash: String,
    pub offer_sequence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoutResultRequest {
    pub winner: BoutWinner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoutResultResponse {
    pub bout_id: String,
    pub bout_status: BoutStatus,
    pub winner: BoutWinner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutPrepareItem {
    pub escrow_id: String,
    pub escrow_kind: EscrowKind,
    pub action: EscrowCloseAction,
    pub unsigned_tx: Value,
    pub xaman_sign_request: XamanSignRequestView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutPrepareResponse {
    pub bout_id: String,
    pub bout_status: BoutStatus,
    pub escrows: Vec<PayoutPrepareItem>,
}

/// An observed EscrowFinish or EscrowCancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutConfirmRequest {
    pub escrow_kind: EscrowKind,
    pub tx_hash: String,
    pub validated: bool,
    pub engine_result: String,
    pub transaction_type: String,
    pub owner_address: String,
    pub offer_sequence: u32,
    pub close_time_ripple: i64,
    pub fulfillment_hex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutConfirmResponse {
    pub bout_id: String,
    pub escrow_id: String,
    pub escrow_kind: EscrowKind,
    pub escrow_status: EscrowStatus,
    pub bout_status: BoutStatus,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningReconcileRequest {
    pub escrow_kind: EscrowKind,
    pub payload_id: String,
    #[serde(default)]
    pub observed_status: Option<String>,
    #[serde(default)]
    pub observed_tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningReconcileResponse {
    pub bout_id: String,
    pub escrow_id: String,
    pub escrow_kind: EscrowKind,
    pub escrow_status: EscrowStatus,
    pub payload_id: String,
    pub signing_status: String,
    pub tx_hash: Option<String>,
    pub failure_code: Option<String>,
}
