//! Bearer-token authentication: spec §6 ("equality comparison MUST be
//! constant-time"). This is the only place auth is enforced (spec §4.7);
//! skills never see caller identity.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Extract the bearer token from an `Authorization: Bearer <token>`
/// header, if present and well-formed.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Constant-time comparison of the provided token against the configured
/// one. Never short-circuits on length so timing cannot leak a prefix
/// match.
pub fn verify_token(provided: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
