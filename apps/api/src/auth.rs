//! Subject extraction from the caller's bearer token.
//!
//! The token is issued and signature-verified by the external identity
//! provider; this service only lifts the `sub` claim out of the payload.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use assent_core::{AppError, AppResult};

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
}

/// Extracts the subject claim from a compact JWT-style bearer token.
pub fn subject_from_bearer(token: &str) -> AppResult<String> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::Unauthorized("malformed bearer token".to_owned()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AppError::Unauthorized("malformed bearer token payload".to_owned()))?;

    let claims: TokenClaims = serde_json::from_slice(bytes.as_slice())
        .map_err(|_| AppError::Unauthorized("bearer token carries no subject claim".to_owned()))?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized(
            "bearer token carries an empty subject claim".to_owned(),
        ));
    }

    Ok(claims.sub)
}
