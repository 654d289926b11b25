//! Registration and login endpoints
//!
//! Both issue a bearer token bound to the account id. Neither requires one.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_auth_event, AuthEvent};

pub const REGISTERED: &str = "User registered successfully";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Body accepted by both endpoints
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

// Keeps the password out of any accidental `{:?}`
impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .user_service
        .register(&request.username, &request.password)
        .await
        .inspect_err(|e| {
            if matches!(e, DomainError::Conflict { .. }) {
                record_auth_event(AuthEvent::RegisterConflict);
            }
        })?;

    let token = state.token_service.issue(user.id())?;

    record_auth_event(AuthEvent::Register);
    info!(user_id = %user.id(), username = %user.username(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: REGISTERED.to_string(),
            token,
            user_id: user.id().value(),
        }),
    ))
}

/// POST /api/login
///
/// Unknown usernames and wrong passwords get the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?
    else {
        record_auth_event(AuthEvent::LoginFailure);
        debug!("Login rejected");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let token = state.token_service.issue(user.id())?;

    record_auth_event(AuthEvent::LoginSuccess);
    info!(user_id = %user.id(), "User logged in");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id().value(),
    }))
}
