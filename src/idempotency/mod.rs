//! Scoped idempotency replay for the confirm endpoints.
//!
//! Requests are hashed over their canonical JSON form (sorted keys, compact
//! separators, ASCII-escaped) so that semantically identical retries hash
//! identically regardless of field order. A stored reply is replayed
//! bit-for-bit, error bodies included; reusing a key with a different payload
//! is a hard conflict.

use std::fmt::Write as _;

use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::models::IdempotencyKey;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdempotencyError {
    #[error("idempotency_key_reused_with_different_payload")]
    KeyReusedWithDifferentPayload,
    #[error("idempotency_response_body_must_be_json_object")]
    ResponseBodyMustBeJsonObject,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A previously stored reply, returned verbatim to the retrying client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyReplay {
    pub status_code: u16,
    pub response_body: Value,
}

/// Render a JSON value in canonical form: object keys sorted, compact
/// separators, all non-ASCII escaped.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => {
            let _ = write!(out, "{number}");
        }
        Value::String(text) => write_string(text, out),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(&map[key.as_str()], out);
            }
            out.push('}');
        }
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7E => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// SHA-256 over the canonical JSON form, lowercase hex.
pub fn hash_request_payload(payload: &Value) -> String {
    hex::encode(Sha256::digest(canonical_json(payload).as_bytes()))
}

/// Scope a confirm operation to one bout so keys cannot collide across bouts.
pub fn build_confirm_scope(operation: &str, bout_id: Uuid) -> String {
    format!("{operation}:{bout_id}")
}

/// Replay protocol over the idempotency rows of the [`Store`].
pub struct IdempotencyService<'a> {
    store: &'a dyn Store,
}

impl<'a> IdempotencyService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Look up a stored reply. `None` means the caller executes the operation;
    /// a hash mismatch means the key was reused with a different payload.
    pub fn load_replay(
        &self,
        scope: &str,
        idempotency_key: &str,
        request_hash: &str,
    ) -> Result<Option<IdempotencyReplay>, IdempotencyError> {
        let Some(existing) = self.store.get_idempotency(scope, idempotency_key) else {
            return Ok(None);
        };
        if existing.request_hash != request_hash {
            return Err(IdempotencyError::KeyReusedWithDifferentPayload);
        }
        let body: Value = serde_json::from_str(&existing.response_body)
            .map_err(|_| IdempotencyError::ResponseBodyMustBeJsonObject)?;
        if !body.is_object() {
            return Err(IdempotencyError::ResponseBodyMustBeJsonObject);
        }
        Ok(Some(IdempotencyReplay {
            status_code: existing.response_code,
            response_body: body,
        }))
    }

    /// Store the reply for this `(scope, key)`; rows are write-once.
    pub fn store_response(
        &self,
        scope: &str,
        idempotency_key: &str,
        request_hash: &str,
        status_code: u16,
        response_body: &Value,
    ) -> Result<(), IdempotencyError> {
        if !response_body.is_object() {
            return Err(IdempotencyError::ResponseBodyMustBeJsonObject);
        }
        self.store.insert_idempotency(IdempotencyKey::new(
            scope.to_string(),
            idempotency_key.to_string(),
            request_hash.to_string(),
            status_code,
            canonical_json(response_body),
        ))?;
        Ok(())
    }
}
