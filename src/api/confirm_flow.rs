//! The idempotency protocol wrapped around both confirm operations.
//!
//! Order on every path: run the mutation (which already wrote its audit and
//! failure rows), store the idempotency reply, then hand the reply back. A
//! failed confirm is stored exactly like a success so retries replay the
//! error verbatim instead of re-entering the mutation.

use serde_json::Value;
use uuid::Uuid;

use crate::api::ApiError;
use crate::idempotency::{
    build_confirm_scope, hash_request_payload, IdempotencyError, IdempotencyService,
};
use crate::store::Store;

/// A reply the transport adapter renders as-is: status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

/// One confirm attempt's idempotency context.
pub(crate) struct ConfirmFlow<'a> {
    store: &'a dyn Store,
    scope: String,
    key: String,
    request_hash: String,
}

impl<'a> ConfirmFlow<'a> {
    /// Validate the idempotency key, hash the request, and look for a stored
    /// reply. `Some(reply)` short-circuits the caller.
    pub fn prepare(
        store: &'a dyn Store,
        operation: &str,
        bout_id: Uuid,
        idempotency_key: Option<&str>,
        request_payload: &Value,
    ) -> Result<(Self, Option<ApiReply>), ApiError> {
        let key = require_idempotency_key(idempotency_key)?;
        let request_hash = hash_request_payload(request_payload);
        let scope = build_confirm_scope(operation, bout_id);

        let replay = IdempotencyService::new(store)
            .load_replay(&scope, &key, &request_hash)
            .map_err(|error| match error {
                IdempotencyError::KeyReusedWithDifferentPayload => ApiError::new(
                    409,
                    "Idempotency-Key was already used with a different request payload.",
                ),
                _ => ApiError::new(409, "Stored idempotent reply could not be loaded."),
            })?;

        let flow = Self {
            store,
            scope,
            key,
            request_hash,
        };
        Ok((
            flow,
            replay.map(|stored| ApiReply {
                status: stored.status_code,
                body: stored.response_body,
            }),
        ))
    }

    /// Store the reply for this attempt and return it. Both success and
    /// mapped-failure replies pass through here.
    pub fn finish(
        &self,
        status: u16,
        body: Value,
        persistence_error_detail: &str,
    ) -> Result<ApiReply, ApiError> {
        IdempotencyService::new(self.store)
            .store_response(&self.scope, &self.key, &self.request_hash, status, &body)
            .map_err(|_| ApiError::new(409, persistence_error_detail))?;
        Ok(ApiReply { status, body })
    }
}

fn require_idempotency_key(raw: Option<&str>) -> Result<String, ApiError> {
    match raw {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ApiError::new(400, "Idempotency-Key header is required.")),
    }
}
