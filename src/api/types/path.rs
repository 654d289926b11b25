//! Path extractor whose rejections use the API error format

use axum::{
    extract::{rejection::PathRejection, FromRequestParts, Path as AxumPath},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::error;

use super::error::ApiError;

/// Wrapper around `axum::extract::Path`
///
/// A segment that cannot be decoded (for example invalid UTF-8 after percent
/// decoding) becomes a 400 in the shared error shape instead of plain text.
#[derive(Debug)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumPath::<T>::from_request_parts(parts, state).await {
            Ok(AxumPath(value)) => Ok(Path(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: PathRejection) -> ApiError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => {
            ApiError::bad_request(format!("Invalid path parameter: {}", err.body_text()))
        }
        // Route and handler disagree; nothing the client can fix
        other => {
            error!(error = %other.body_text(), "Path extraction misconfigured");
            ApiError::internal()
        }
    }
}
