//! Stored replies for the idempotent confirm endpoints.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One stored reply, unique per `(scope, idempotency_key)` and read-only after
/// first write. `response_body` is canonical JSON of a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey {
    pub id: Uuid,
    pub scope: String,
    pub idempotency_key: String,
    pub request_hash: String,
    pub response_code: u16,
    pub response_body: String,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyKey {
    pub fn new(
        scope: String,
        idempotency_key: String,
        request_hash: String,
        response_code: u16,
        response_body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            idempotency_key,
            request_hash,
            response_code,
            response_body,
            created_at: Utc::now(),
        }
    }
}
