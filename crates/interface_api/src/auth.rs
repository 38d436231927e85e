//! Authentication and authorization
//!
//! Bearer tokens are JWTs whose claims carry the caller's role names.
//! Authorization resolves those names against the built-in role table and
//! runs the capability predicate; there is no per-request database lookup.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain_access::{can_access, AccessLevel, ResourceType, Role};

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Role names held by the caller
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `username` - Token subject
/// * `roles` - Role names to embed
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    username: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: username.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if matches!(
            e.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ) {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

/// Authorizes the caller for a resource at a required access level
///
/// Unknown role names in the token are ignored rather than rejected; a
/// token carrying only unknown roles simply holds no capabilities.
pub fn authorize(
    claims: &Claims,
    resource: ResourceType,
    required: AccessLevel,
) -> Result<(), ApiError> {
    let roles: Vec<Role> = claims
        .roles
        .iter()
        .filter_map(|name| Role::builtin(name).cloned())
        .collect();

    if can_access(&roles, resource, required) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "requires {}:{}",
            resource, required
        )))
    }
}
