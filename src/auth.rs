//! Admin authentication with short-lived JWTs.
//!
//! Admin endpoints are guarded by a bearer token issued against the
//! configured admin credentials. Tokens are HS256-signed with the secret
//! from [`crate::config::Settings`] and expire after 24 hours.

use crate::{
    config::Settings,
    errors::{Error, Result},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token lifetime in seconds (24 hours).
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried by an admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin email the token was issued to
    pub sub: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Checks the given credentials against the configured admin account and
/// issues a signed token on success.
///
/// # Errors
/// Returns [`Error::Unauthorized`] when the credentials do not match.
pub fn issue_admin_token(settings: &Settings, email: &str, password: &str) -> Result<String> {
    if email != settings.admin_email || password != settings.admin_password {
        return Err(Error::Unauthorized);
    }

    let claims = Claims {
        sub: email.to_string(),
        exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.admin_jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verifies an admin token's signature and expiry, returning its claims.
///
/// # Errors
/// Returns a token error (mapped to 401 at the API layer) for anything
/// malformed, forged, or expired.
pub fn verify_admin_token(settings: &Settings, token: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.admin_jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
