//! Accounts, password hashing, and bearer-token issuance.

pub mod password;
pub mod token;

pub use password::{hash_password, hash_password_with_salt, verify_password};
pub use token::{create_access_token, decode_access_token, AccessTokenClaims};

use strum_macros::Display;

use crate::config::Settings;
use crate::models::{User, UserRole};
use crate::store::{Store, StoreError};

/// Exception for registration, login, and token handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuthError {
    PasswordTooShort,
    EmailAlreadyExists,
    InvalidCredentials,
    InvalidTokenFormat,
    InvalidTokenSignature,
    InvalidToken,
    TokenExpired,
}

impl std::error::Error for AuthError {}

/// Register a new account. Emails are normalized lowercase and unique.
pub fn register_user(
    store: &dyn Store,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<User, AuthError> {
    let normalized_email = email.trim().to_lowercase();
    if store.find_user_by_email(&normalized_email).is_some() {
        return Err(AuthError::EmailAlreadyExists);
    }
    let user = User::new(normalized_email, hash_password(password)?, role);
    match store.insert_user(user.clone()) {
        Ok(()) => Ok(user),
        Err(StoreError::UniqueViolation { .. }) => Err(AuthError::EmailAlreadyExists),
        Err(StoreError::RowNotFound { .. }) => Err(AuthError::InvalidCredentials),
    }
}

/// Verify credentials; `None` deliberately does not reveal which check failed.
pub fn authenticate_user(store: &dyn Store, email: &str, password: &str) -> Option<User> {
    let normalized_email = email.trim().to_lowercase();
    let user = store.find_user_by_email(&normalized_email)?;
    if !verify_password(password, &user.password_hash) {
        return None;
    }
    Some(user)
}

/// Issue a bearer token for a registered user.
pub fn issue_access_token(settings: &Settings, user: &User) -> String {
    create_access_token(
        &user.id.to_string(),
        &user.email,
        &user.role.to_string(),
        &settings.jwt_secret,
        settings.jwt_exp_minutes,
        None,
    )
}
