//! Bearer token guard for protected routes

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::UserId;
use crate::infrastructure::observability::{record_auth_event, AuthEvent};

pub const TOKEN_REQUIRED: &str = "Access token required";
pub const TOKEN_INVALID: &str = "Invalid or expired token";

/// Extractor that requires a valid bearer token
///
/// Yields the identity embedded in the token. The user row is not re-read;
/// a token stays usable until it expires even if its account is gone.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub UserId);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized(TOKEN_REQUIRED))?;

        match state.token_service.verify(token) {
            Ok(user_id) => Ok(RequireUser(user_id)),
            Err(e) => {
                debug!(reason = %e, "Rejected bearer token");
                record_auth_event(AuthEvent::TokenRejected);
                Err(ApiError::invalid_token(TOKEN_INVALID))
            }
        }
    }
}

/// Token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively. Any other scheme, an empty
/// token or a header that is not visible ASCII counts as no token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers_with("Bearer eyJhbGciOiJIUzI1NiJ9.test");
        assert_eq!(
            extract_bearer_token(&headers),
            Some("eyJhbGciOiJIUzI1NiJ9.test")
        );
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_invalid_auth_scheme() {
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers_with("BEARER abc")), Some("abc"));
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer    ")), None);
    }

    #[test]
    fn test_trimmed_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer   token-with-spaces   ")),
            Some("token-with-spaces")
        );
    }
}
