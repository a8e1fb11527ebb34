//! Domain entities and the enums that drive the bout/escrow state machines.

pub mod audit_log;
pub mod bout;
pub mod escrow;
pub mod idempotency_key;
pub mod user;

pub use audit_log::{AuditLog, AuditOutcome};
pub use bout::Bout;
pub use escrow::Escrow;
pub use idempotency_key::IdempotencyKey;
pub use user::{FighterProfile, User};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Account roles; escrow and payout endpoints are promoter-gated, result entry
/// is admin-gated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Promoter,
    Fighter,
    Management,
    Admin,
}

/// Bout lifecycle. Progression is monotonic; `ReadyForEscrow` exists in the
/// stored enum but no current operation targets it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BoutStatus {
    Draft,
    ReadyForEscrow,
    EscrowsCreated,
    ResultEntered,
    PayoutsInProgress,
    Closed,
}

impl BoutStatus {
    /// Escrow-create payloads may be prepared while drafting and re-prepared
    /// after the set is confirmed.
    pub fn allows_escrow_prepare(self) -> bool {
        matches!(self, BoutStatus::Draft | BoutStatus::EscrowsCreated)
    }

    /// Payout payloads may be prepared or confirmed once a result exists and
    /// until the bout closes.
    pub fn allows_payout(self) -> bool {
        matches!(self, BoutStatus::ResultEntered | BoutStatus::PayoutsInProgress)
    }
}

/// The four purses deposited per bout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowKind {
    ShowA,
    ShowB,
    BonusA,
    BonusB,
}

impl EscrowKind {
    /// Deterministic planning order: shows first, then bonuses.
    pub const ALL: [EscrowKind; 4] = [
        EscrowKind::ShowA,
        EscrowKind::ShowB,
        EscrowKind::BonusA,
        EscrowKind::BonusB,
    ];

    /// Bonus purses carry a crypto-condition and a reclaim window.
    pub fn is_bonus(self) -> bool {
        matches!(self, EscrowKind::BonusA | EscrowKind::BonusB)
    }
}

/// Escrow lifecycle: `Planned → Created → (Finished | Cancelled)`. `Failed` is
/// a terminal observational marker and is never reached on the happy path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Planned,
    Created,
    Finished,
    Cancelled,
    Failed,
}

/// Recorded bout winner; set at result entry and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BoutWinner {
    A,
    B,
}

impl BoutWinner {
    /// Resolve `(winner_bonus, loser_bonus)` escrow kinds for this result.
    pub fn bonus_kinds(self) -> (EscrowKind, EscrowKind) {
        match self {
            BoutWinner::A => (EscrowKind::BonusA, EscrowKind::BonusB),
            BoutWinner::B => (EscrowKind::BonusB, EscrowKind::BonusA),
        }
    }
}

/// How a created escrow leaves the ledger during payout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowCloseAction {
    Finish,
    Cancel,
}

impl EscrowCloseAction {
    /// The escrow status a validated close confirmation transitions into.
    pub fn target_status(self) -> EscrowStatus {
        match self {
            EscrowCloseAction::Finish => EscrowStatus::Finished,
            EscrowCloseAction::Cancel => EscrowStatus::Cancelled,
        }
    }

    /// Whether an escrow is already in the terminal state this action aims at.
    pub fn is_settled(self, status: EscrowStatus) -> bool {
        status == self.target_status()
    }
}
