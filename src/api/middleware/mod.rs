//! API middleware components

pub mod logging;
pub mod metrics;
pub mod security;
pub mod user_auth;

use axum::{body::Body, extract::MatchedPath, http::Request};

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use security::security_headers_middleware;
pub use user_auth::{extract_bearer_token, RequireUser, TOKEN_INVALID, TOKEN_REQUIRED};

/// Route template (`/api/posts/{id}`) when matched, raw path otherwise
pub(crate) fn route_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}
