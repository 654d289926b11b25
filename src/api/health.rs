//! Health check endpoints for orchestrators

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::warn;

use crate::api::types::Json;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub latency_ms: u64,
}

/// Process is up; reports the build version
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness: the credential store answers a trivial query
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let store_check = check_store(&state).await;
    let overall_status = store_check.status;

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![store_check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness: the process answers HTTP
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    // Failure detail goes to the log, never into the response body
    let status = match state.user_service.ping().await {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            HealthStatus::Unhealthy
        }
    };

    HealthCheck {
        name: "store".to_string(),
        status,
        latency_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::to_bytes, response::Response};

    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::post::{InMemoryPostRepository, PostService};
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, UserService};

    fn state_with(users: Arc<MockUserRepository>) -> AppState {
        let posts = InMemoryPostRepository::new(Arc::new(InMemoryUserRepository::new()));
        AppState::new(
            Arc::new(UserService::new(users, Arc::new(Argon2Hasher::new()))),
            Arc::new(PostService::new(Arc::new(posts))),
            Arc::new(JwtService::new(JwtConfig::new("health-secret", 60)).unwrap()),
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ready_when_store_answers() {
        let state = state_with(Arc::new(MockUserRepository::new()));

        let response = ready_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["checks"][0]["name"], "store");
        assert_eq!(body["checks"][0]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_not_ready_when_store_fails() {
        let users = Arc::new(MockUserRepository::new());
        users.set_should_fail(true).await;

        let response = ready_check(State(state_with(users))).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["status"], "unhealthy");
        assert!(!body.to_string().contains("Mock repository"));
    }
}
