//! Account rows: users and the fighter profiles that pin XRPL addresses.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::UserRole;

/// A registered account. Emails are stored normalized lowercase and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Public fighter identity with the payout destination address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FighterProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub xrpl_address: String,
    pub created_at: DateTime<Utc>,
}

impl FighterProfile {
    pub fn new(user_id: Uuid, display_name: String, xrpl_address: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            display_name,
            xrpl_address,
            created_at: Utc::now(),
        }
    }
}
