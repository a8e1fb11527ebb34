//! A single on-ledger escrow as this system plans and tracks it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{EscrowKind, EscrowStatus};

/// One of the four purses of a bout, unique per `(bout_id, kind)`.
///
/// `condition_hex`/`encrypted_preimage_hex` are set iff the kind is a bonus;
/// `offer_sequence` and `create_tx_hash` are recorded by a validated
/// EscrowCreate confirmation, `close_tx_hash` by a validated finish or cancel.
/// Failure fields are observational only and never gate a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escrow {
    pub id: Uuid,
    pub bout_id: Uuid,
    pub kind: EscrowKind,
    pub status: EscrowStatus,
    pub owner_address: String,
    pub destination_address: String,
    pub amount_drops: i64,
    pub finish_after_ripple: i64,
    pub cancel_after_ripple: Option<i64>,
    pub condition_hex: Option<String>,
    pub encrypted_preimage_hex: Option<String>,
    pub offer_sequence: Option<u32>,
    pub create_tx_hash: Option<String>,
    pub close_tx_hash: Option<String>,
    pub failure_code: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Escrow {
    /// Stamp a failure marker without touching the state machine.
    pub fn mark_failure(&mut self, code: String, reason: String) {
        self.failure_code = Some(code);
        self.failure_reason = Some(reason);
    }

    /// Clear any recorded failure marker.
    pub fn clear_failure(&mut self) {
        self.failure_code = None;
        self.failure_reason = None;
    }
}
