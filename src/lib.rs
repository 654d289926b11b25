//! PMP Blog API
//!
//! A small blogging backend:
//! - Account registration and login with Argon2 password digests
//! - Stateless signed bearer tokens
//! - Public post reads, author-only edits and deletes
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};

use api::state::{AppState, PostServiceTrait, UserServiceTrait};
use crate::config::{AuthConfig, StorageConfig};
use domain::user::CredentialPolicy;
use infrastructure::{
    auth::{parse_algorithm, JwtConfig, JwtService, TokenService},
    post::{InMemoryPostRepository, PostService, PostgresPostRepository},
    storage::{connect_pool, run_migrations, PostgresConfig, StorageType},
    user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService},
};

/// Create the application state with all services initialized
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let token_service: Arc<dyn TokenService> = Arc::new(create_token_service(&config.auth)?);
    let policy = config.accounts.clone();

    let backend = StorageType::from_str(&config.storage.backend).with_context(|| {
        format!(
            "Unknown storage backend '{}'. Use 'memory' or 'postgres'.",
            config.storage.backend
        )
    })?;

    info!("Storage backend: {:?}", backend);

    let state = match backend {
        StorageType::InMemory => create_in_memory_app_state(token_service, policy),
        StorageType::Postgres => {
            let pool = connect_postgres(&config.storage).await?;

            if config.storage.run_migrations {
                run_migrations(&pool).await?;
            }

            create_postgres_app_state(pool, token_service, policy)
        }
    };

    state
        .user_service
        .prepare()
        .await
        .context("Failed to prepare credential verification")?;

    Ok(state)
}

/// State backed by process memory; everything is lost on exit
pub fn create_in_memory_app_state(
    token_service: Arc<dyn TokenService>,
    policy: CredentialPolicy,
) -> AppState {
    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new(Arc::clone(&users)));

    let user_service: Arc<dyn UserServiceTrait> = Arc::new(UserService::with_policy(
        users,
        Arc::new(Argon2Hasher::new()),
        policy,
    ));
    let post_service: Arc<dyn PostServiceTrait> = Arc::new(PostService::new(posts));

    AppState::new(user_service, post_service, token_service)
}

fn create_postgres_app_state(
    pool: PgPool,
    token_service: Arc<dyn TokenService>,
    policy: CredentialPolicy,
) -> AppState {
    let user_service: Arc<dyn UserServiceTrait> = Arc::new(UserService::with_policy(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2Hasher::new()),
        policy,
    ));
    let post_service: Arc<dyn PostServiceTrait> =
        Arc::new(PostService::new(Arc::new(PostgresPostRepository::new(pool))));

    AppState::new(user_service, post_service, token_service)
}

/// Connect to the configured PostgreSQL database
pub async fn connect_postgres(storage: &StorageConfig) -> anyhow::Result<PgPool> {
    let url = storage.resolve_database_url().context(
        "PostgreSQL storage requires storage.database_url, DATABASE_URL or PG_HOST/PG_DATABASE",
    )?;

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(url)
            .with_max_connections(storage.max_connections)
            .with_connect_timeout(storage.connect_timeout_secs),
    )
    .await?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

/// Create the token service from config, `JWT_SECRET`, or a random secret
fn create_token_service(auth: &AuthConfig) -> anyhow::Result<JwtService> {
    let secret = auth.resolve_secret().unwrap_or_else(|| {
        warn!(
            "No JWT secret configured. Generating random secret. \
            Tokens will NOT survive a restart. \
            Set JWT_SECRET or APP__AUTH__JWT_SECRET for persistent sessions."
        );
        generate_random_secret()
    });

    let algorithm = parse_algorithm(&auth.algorithm)?;
    let service =
        JwtService::new(JwtConfig::new(secret, auth.token_ttl_secs).with_algorithm(algorithm))?;

    Ok(service)
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret_shape() {
        let a = generate_random_secret();
        let b = generate_random_secret();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_configured_secret_is_fatal() {
        let auth = AuthConfig {
            jwt_secret: Some(String::new()),
            ..Default::default()
        };
        assert!(create_token_service(&auth).is_err());
    }

    #[test]
    fn test_unsupported_algorithm_is_fatal() {
        let auth = AuthConfig {
            jwt_secret: Some("s".to_string()),
            algorithm: "RS256".to_string(),
            ..Default::default()
        };
        assert!(create_token_service(&auth).is_err());
    }

    #[test]
    fn test_configured_ttl_applies() {
        let auth = AuthConfig {
            jwt_secret: Some("s".to_string()),
            token_ttl_secs: 60,
            ..Default::default()
        };
        assert_eq!(create_token_service(&auth).unwrap().ttl_secs(), 60);
    }

    #[tokio::test]
    async fn test_memory_backend_builds_state() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("s".to_string());

        let state = create_app_state_with_config(&config).await.unwrap();
        assert_eq!(state.user_service.count().await.unwrap(), 0);
        assert!(state.user_service.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("s".to_string());
        config.storage.backend = "sqlite".to_string();

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
