use crate::error::{AppError, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: u64,
}

impl Claims {
    #[must_use]
    pub const fn new(sub: Uuid, exp: u64) -> Self {
        Self { sub, exp }
    }
}

/// Signs a set of claims into a bearer token. Token issuance belongs to the
/// identity service; this exists for tests and tooling.
///
/// # Errors
/// Returns `AppError::Internal` if signing fails.
pub fn encode_jwt(claims: &Claims, secret: &str) -> Result<String> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| AppError::Internal)
}

/// Verifies a bearer token and returns its claims.
///
/// # Errors
/// Returns `AppError::AuthError` if the token is malformed, expired, or has
/// a bad signature.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::AuthError)
}
