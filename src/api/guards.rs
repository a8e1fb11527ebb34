//! Bearer-token authentication and role gates.

use std::str::FromStr;

use uuid::Uuid;

use crate::api::ApiError;
use crate::auth::decode_access_token;
use crate::config::Settings;
use crate::models::UserRole;

/// The authenticated caller, as carried by the bearer token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestActor {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// Resolve the `Authorization` header into an actor.
pub fn authenticate(
    settings: &Settings,
    authorization: Option<&str>,
) -> Result<RequestActor, ApiError> {
    let header = authorization
        .ok_or_else(|| ApiError::new(401, "Authorization header is required."))?;
    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(ApiError::new(
            401,
            "Authorization header must use Bearer token format.",
        ));
    }

    let claims = decode_access_token(token.trim(), &settings.jwt_secret, None)
        .map_err(|_| ApiError::new(401, "Invalid or expired access token."))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::new(401, "Invalid access token claims."))?;
    let role = UserRole::from_str(&claims.role)
        .map_err(|_| ApiError::new(401, "Invalid access token claims."))?;
    Ok(RequestActor {
        user_id,
        email: claims.email,
        role,
    })
}

/// Reject actors whose role does not match the endpoint's gate.
pub fn require_role(actor: &RequestActor, required_role: UserRole) -> Result<(), ApiError> {
    if actor.role != required_role {
        return Err(ApiError::new(403, "Insufficient role for this operation."));
    }
    Ok(())
}
