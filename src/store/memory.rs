//! In-memory store used by the services' tests and stub deployments.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{
    AuditLog, Bout, Escrow, EscrowKind, FighterProfile, IdempotencyKey, User,
};
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    users_by_email: HashMap<String, Uuid>,
    fighter_profiles: HashMap<Uuid, FighterProfile>,
    bouts: HashMap<Uuid, Bout>,
    escrows: HashMap<Uuid, Escrow>,
    escrows_by_bout_kind: HashMap<(Uuid, EscrowKind), Uuid>,
    audit_log: Vec<AuditLog>,
    idempotency: HashMap<(String, String), IdempotencyKey>,
}

/// Hash-map-backed [`Store`] with the same unique constraints the relational
/// schema enforces.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.users_by_email.contains_key(&user.email) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_users_email",
            });
        }
        inner.users_by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user);
        Ok(())
    }

    fn get_user(&self, id: Uuid) -> Option<User> {
        self.inner.read().users.get(&id).cloned()
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read();
        let id = inner.users_by_email.get(email)?;
        inner.users.get(id).cloned()
    }

    fn insert_fighter_profile(&self, profile: FighterProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.fighter_profiles.contains_key(&profile.user_id) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_fighter_profiles_user_id",
            });
        }
        inner.fighter_profiles.insert(profile.user_id, profile);
        Ok(())
    }

    fn find_fighter_profile(&self, user_id: Uuid) -> Option<FighterProfile> {
        self.inner.read().fighter_profiles.get(&user_id).cloned()
    }

    fn insert_bout(&self, bout: Bout) -> Result<(), StoreError> {
        self.inner.write().bouts.insert(bout.id, bout);
        Ok(())
    }

    fn get_bout(&self, id: Uuid) -> Option<Bout> {
        self.inner.read().bouts.get(&id).cloned()
    }

    fn update_bout(&self, bout: Bout) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.bouts.contains_key(&bout.id) {
            return Err(StoreError::RowNotFound { entity: "bout" });
        }
        inner.bouts.insert(bout.id, bout);
        Ok(())
    }

    fn insert_escrow(&self, escrow: Escrow) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let index_key = (escrow.bout_id, escrow.kind);
        if inner.escrows_by_bout_kind.contains_key(&index_key) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_escrow_bout_kind",
            });
        }
        inner.escrows_by_bout_kind.insert(index_key, escrow.id);
        inner.escrows.insert(escrow.id, escrow);
        Ok(())
    }

    fn get_escrow(&self, bout_id: Uuid, kind: EscrowKind) -> Option<Escrow> {
        let inner = self.inner.read();
        let id = inner.escrows_by_bout_kind.get(&(bout_id, kind))?;
        inner.escrows.get(id).cloned()
    }

    fn list_escrows(&self, bout_id: Uuid) -> Vec<Escrow> {
        let inner = self.inner.read();
        let mut escrows: Vec<Escrow> = inner
            .escrows
            .values()
            .filter(|escrow| escrow.bout_id == bout_id)
            .cloned()
            .collect();
        escrows.sort_by_key(|escrow| {
            EscrowKind::ALL
                .iter()
                .position(|kind| *kind == escrow.kind)
                .unwrap_or(EscrowKind::ALL.len())
        });
        escrows
    }

    fn update_escrow(&self, escrow: Escrow) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.escrows.contains_key(&escrow.id) {
            return Err(StoreError::RowNotFound { entity: "escrow" });
        }
        inner.escrows.insert(escrow.id, escrow);
        Ok(())
    }

    fn append_audit(&self, entry: AuditLog) {
        self.inner.write().audit_log.push(entry);
    }

    fn list_audit_for_entity(&self, entity_id: &str) -> Vec<AuditLog> {
        self.inner
            .read()
            .audit_log
            .iter()
            .filter(|entry| entry.entity_id == entity_id)
            .cloned()
            .collect()
    }

    fn get_idempotency(&self, scope: &str, idempotency_key: &str) -> Option<IdempotencyKey> {
        self.inner
            .read()
            .idempotency
            .get(&(scope.to_string(), idempotency_key.to_string()))
            .cloned()
    }

    fn insert_idempotency(&self, row: IdempotencyKey) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let key = (row.scope.clone(), row.idempotency_key.clone());
        if inner.idempotency.contains_key(&key) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_idempotency_scope_key",
            });
        }
        inner.idempotency.insert(key, row);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::UserRole;

    #[test]
    fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert_user(User::new(
                "one@example.test".to_string(),
                "hash".to_string(),
                UserRole::Promoter,
            ))
            .unwrap();
        let duplicate = store.insert_user(User::new(
            "one@example.test".to_string(),
            "hash".to_string(),
            UserRole::Fighter,
        ));
        assert_eq!(
            duplicate.unwrap_err(),
            StoreError::UniqueViolation {
                constraint: "uq_users_email"
            }
        );
    }

    #[test]
    fn fighter_profiles_are_unique_per_user() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        store
            .insert_fighter_profile(FighterProfile::new(
                user_id,
                "A. Fighter".to_string(),
                "rFighterAddress".to_string(),
            ))
            .unwrap();
        assert_eq!(
            store.find_fighter_profile(user_id).unwrap().display_name,
            "A. Fighter"
        );
        assert!(store
            .insert_fighter_profile(FighterProfile::new(
                user_id,
                "Duplicate".to_string(),
                "rOtherAddress".to_string(),
            ))
            .is_err());
    }

    #[test]
    fn duplicate_escrow_kind_is_rejected() {
        let store = MemoryStore::new();
        let escrow = crate::transactions::test_fixtures::planned_escrow(EscrowKind::ShowA, None);
        let mut duplicate = escrow.clone();
        duplicate.id = Uuid::new_v4();
        store.insert_escrow(escrow).unwrap();
        assert_eq!(
            store.insert_escrow(duplicate).unwrap_err(),
            StoreError::UniqueViolation {
                constraint: "uq_escrow_bout_kind"
            }
        );
    }

    #[test]
    fn list_escrows_is_kind_ordered() {
        let store = MemoryStore::new();
        let bout_id = Uuid::new_v4();
        for kind in [
            EscrowKind::BonusB,
            EscrowKind::ShowB,
            EscrowKind::BonusA,
            EscrowKind::ShowA,
        ] {
            let mut escrow = crate::transactions::test_fixtures::planned_escrow(kind, None);
            escrow.bout_id = bout_id;
            store.insert_escrow(escrow).unwrap();
        }
        let kinds: Vec<EscrowKind> = store
            .list_escrows(bout_id)
            .into_iter()
            .map(|escrow| escrow.kind)
            .collect();
        assert_eq!(kinds, EscrowKind::ALL.to_vec());
    }

    #[test]
    fn idempotency_rows_are_write_once() {
        let store = MemoryStore::new();
        let row = IdempotencyKey::new(
            "escrow_create_confirm:b".to_string(),
            "key-1".to_string(),
            "hash".to_string(),
            200,
            "{}".to_string(),
        );
        store.insert_idempotency(row.clone()).unwrap();
        assert!(store.insert_idempotency(row).is_err());
    }
}
