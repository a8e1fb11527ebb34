//! The bout aggregate: two fighters, four purse amounts, one winner.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{BoutStatus, BoutWinner};

/// A scheduled bout and the timing anchors its escrows derive from.
///
/// `finish_after_utc` and `cancel_after_utc` are computed once at planning time
/// (event + 2h, event + 7d) and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bout {
    pub id: Uuid,
    pub promoter_user_id: Uuid,
    pub fighter_a_user_id: Uuid,
    pub fighter_b_user_id: Uuid,
    pub event_datetime_utc: DateTime<Utc>,
    pub finish_after_utc: DateTime<Utc>,
    pub cancel_after_utc: DateTime<Utc>,
    pub show_a_drops: i64,
    pub show_b_drops: i64,
    pub bonus_a_drops: i64,
    pub bonus_b_drops: i64,
    pub status: BoutStatus,
    pub winner: Option<BoutWinner>,
    pub created_at: DateTime<Utc>,
}
