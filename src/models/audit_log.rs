//! Append-only audit trail of every state-changing attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

/// Outcome of an audited attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Rejected,
    Pending,
    Observed,
    Unknown,
}

/// One audit row. `details_json` is canonical JSON (sorted keys, compact
/// separators) so replayed attempts compare bit-identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLog {
    pub id: Uuid,
    pub actor_user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub outcome: AuditOutcome,
    pub details_json: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        actor_user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: String,
        outcome: AuditOutcome,
        details_json: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_user_id,
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            outcome,
            details_json,
            created_at: Utc::now(),
        }
    }
}
