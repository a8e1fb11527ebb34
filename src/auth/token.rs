//! HS256 access tokens carrying `sub`, `email`, and `role` claims.
//!
//! Expiry is checked explicitly after decoding so an expired token reports
//! `token_expired` rather than a generic decode failure.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mint a signed access token. `now` is injectable for tests.
pub fn create_access_token(
    subject: &str,
    email: &str,
    role: &str,
    secret_key: &str,
    expires_minutes: i64,
    now: Option<DateTime<Utc>>,
) -> String {
    let issued_at = now.unwrap_or_else(Utc::now);
    let expires_at = issued_at + Duration::minutes(expires_minutes);
    let claims = AccessTokenClaims {
        sub: subject.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret_key.as_bytes()),
    )
    .expect("HS256 encoding with in-memory claims cannot fail")
}

/// Decode and verify an access token, then check expiry against `now`.
pub fn decode_access_token(
    token: &str,
    secret_key: &str,
    now: Option<DateTime<Utc>>,
) -> Result<AccessTokenClaims, AuthError> {
    if token.matches('.').count() != 2 {
        return Err(AuthError::InvalidTokenFormat);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let decoded = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret_key.as_bytes()),
        &validation,
    )
    .map_err(|error| match error.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidTokenSignature,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            AuthError::InvalidTokenFormat
        }
        _ => AuthError::InvalidToken,
    })?;

    let current = now.unwrap_or_else(Utc::now).timestamp();
    if current >= decoded.claims.exp {
        return Err(AuthError::TokenExpired);
    }
    Ok(decoded.claims)
}
