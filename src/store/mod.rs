//! Typed boundary over the relational store.
//!
//! The store itself is an external collaborator; services talk to this trait
//! and every test runs against the in-memory implementation. Each
//! state-changing request is one unit of isolation: the backing
//! implementation guarantees commit-or-rollback per call sequence.

mod memory;

pub use memory::MemoryStore;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AuditLog, Bout, Escrow, EscrowKind, FighterProfile, IdempotencyKey, User,
};

/// Persistence failures surfaced to the transport layer as integrity errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: &'static str },
    #[error("row not found: {entity}")]
    RowNotFound { entity: &'static str },
}

/// Repository surface the services mutate through.
pub trait Store: Send + Sync {
    fn insert_user(&self, user: User) -> Result<(), StoreError>;
    fn get_user(&self, id: Uuid) -> Option<User>;
    fn find_user_by_email(&self, email: &str) -> Option<User>;

    fn insert_fighter_profile(&self, profile: FighterProfile) -> Result<(), StoreError>;
    fn find_fighter_profile(&self, user_id: Uuid) -> Option<FighterProfile>;

    fn insert_bout(&self, bout: Bout) -> Result<(), StoreError>;
    fn get_bout(&self, id: Uuid) -> Option<Bout>;
    fn update_bout(&self, bout: Bout) -> Result<(), StoreError>;

    fn insert_escrow(&self, escrow: Escrow) -> Result<(), StoreError>;
    fn get_escrow(&self, bout_id: Uuid, kind: EscrowKind) -> Option<Escrow>;
    fn list_escrows(&self, bout_id: Uuid) -> Vec<Escrow>;
    fn update_escrow(&self, escrow: Escrow) -> Result<(), StoreError>;

    fn append_audit(&self, entry: AuditLog);
    fn list_audit_for_entity(&self, entity_id: &str) -> Vec<AuditLog>;

    fn get_idempotency(&self, scope: &str, idempotency_key: &str) -> Option<IdempotencyKey>;
    fn insert_idempotency(&self, row: IdempotencyKey) -> Result<(), StoreError>;
}
