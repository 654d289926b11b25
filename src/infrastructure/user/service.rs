//! User service for registration and authentication

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::domain::user::{normalize_username, CredentialPolicy, NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Message shared by the pre-check and the store-level uniqueness backstop
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Verified against when the username is unknown, so both login failure
/// paths pay for one hash verification.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing-equalization";

/// User service for registration and authentication
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    policy: CredentialPolicy,
    dummy_hash: OnceCell<String>,
}

impl<R: UserRepository, H: PasswordHasher + 'static> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self::with_policy(repository, hasher, CredentialPolicy::default())
    }

    pub fn with_policy(repository: Arc<R>, hasher: Arc<H>, policy: CredentialPolicy) -> Self {
        Self {
            repository,
            hasher,
            policy,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Register a new account
    ///
    /// The username lookup is only a fast path; the repository's uniqueness
    /// guarantee decides the outcome when two registrations race.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let username = normalize_username(username);

        self.policy
            .validate_username(&username)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        self.policy
            .validate_password(password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(&username).await? {
            return Err(DomainError::conflict(USERNAME_TAKEN));
        }

        let password_hash = self.hash_blocking(password).await?;

        match self
            .repository
            .create(NewUser::new(username.as_str(), password_hash))
            .await
        {
            Ok(user) => Ok(user),
            Err(DomainError::Conflict { .. }) => {
                debug!(username = %username, "Registration lost uniqueness race");
                Err(DomainError::conflict(USERNAME_TAKEN))
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticate a user with username and password
    ///
    /// Unknown usernames and wrong passwords are both `Ok(None)`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let username = normalize_username(username);

        let user = match self.repository.get_by_username(&username).await? {
            Some(u) => u,
            None => {
                let dummy = self.dummy_hash().await?;
                self.verify_blocking(password, dummy).await?;
                return Ok(None);
            }
        };

        if self
            .verify_blocking(password, user.password_hash().to_string())
            .await?
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Get a user by ID
    pub async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Count users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Check the user store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    /// Compute the digest used for unknown usernames ahead of the first login
    pub async fn prepare(&self) -> Result<(), DomainError> {
        self.dummy_hash().await.map(|_| ())
    }

    async fn dummy_hash(&self) -> Result<String, DomainError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }

        let hash = self.hash_blocking(DUMMY_PASSWORD).await?;
        // A concurrent caller may have won; either digest verifies the same way
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    async fn hash_blocking(&self, password: &str) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_blocking(&self, password: &str, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;
    use tokio_test::{assert_err, assert_ok};

    fn create_service() -> UserService<InMemoryUserRepository, Argon2Hasher> {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2Hasher::new());
        UserService::new(repository, hasher)
    }

    #[tokio::test]
    async fn test_register_user() {
        let service = create_service();

        let user = service.register("alice", "pw1").await.unwrap();
        assert_eq!(user.username(), "alice");
        assert_ne!(user.password_hash(), "pw1");
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_trims_username() {
        let service = create_service();

        let user = service.register("  alice  ", "pw1").await.unwrap();
        assert_eq!(user.username(), "alice");

        let result = service.register("alice", "pw2").await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_register_twice_conflicts_and_creates_one_row() {
        let service = create_service();

        assert_ok!(service.register("alice", "pw1").await);
        let err = service.register("alice", "other").await.unwrap_err();

        assert_eq!(err.to_string(), format!("Conflict: {}", USERNAME_TAKEN));
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_lost_race_maps_to_conflict() {
        let repository = Arc::new(MockUserRepository::new());
        repository.set_conflict_on_create(true).await;
        let service = UserService::new(repository, Arc::new(Argon2Hasher::new()));

        let err = service.register("alice", "pw1").await.unwrap_err();
        assert_eq!(err.to_string(), format!("Conflict: {}", USERNAME_TAKEN));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_credentials() {
        let service = create_service();

        let result = service.register("   ", "pw1").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = service.register("alice", "").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_applies_configured_policy() {
        let policy = CredentialPolicy {
            min_password_length: 8,
            ..Default::default()
        };
        let service = UserService::with_policy(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
            policy,
        );

        let result = service.register("alice", "short").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_ok!(service.register("alice", "long-enough").await);
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let service = create_service();
        let created = service.register("alice", "pw1").await.unwrap();

        let user = service.authenticate("alice", "pw1").await.unwrap();
        assert_eq!(user.unwrap().id(), created.id());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_and_unknown_user_look_alike() {
        let service = create_service();
        service.register("alice", "pw1").await.unwrap();

        let wrong_password = service.authenticate("alice", "nope").await.unwrap();
        let unknown_user = service.authenticate("mallory", "pw1").await.unwrap();

        assert!(wrong_password.is_none());
        assert!(unknown_user.is_none());
    }

    #[tokio::test]
    async fn test_prepare_fills_dummy_digest_once() {
        let service = create_service();
        assert!(service.dummy_hash.get().is_none());

        service.prepare().await.unwrap();
        let first = service.dummy_hash.get().cloned().unwrap();
        assert!(first.starts_with("$argon2id$"));

        assert!(service.authenticate("mallory", "pw1").await.unwrap().is_none());
        assert_eq!(service.dummy_hash.get(), Some(&first));
    }

    #[tokio::test]
    async fn test_unknown_user_without_prepare_still_rejected() {
        let service = create_service();

        assert!(service.authenticate("mallory", "pw1").await.unwrap().is_none());
        assert!(service.dummy_hash.get().is_some());
    }

    #[tokio::test]
    async fn test_authenticate_storage_failure_propagates() {
        let repository = Arc::new(MockUserRepository::new());
        repository.set_should_fail(true).await;
        let service = UserService::new(repository, Arc::new(Argon2Hasher::new()));

        let result = service.authenticate("alice", "pw1").await;
        assert_err!(&result);
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_ping_reports_store_failure() {
        let repository = Arc::new(MockUserRepository::new());
        let service = UserService::new(Arc::clone(&repository), Arc::new(Argon2Hasher::new()));
        assert_ok!(service.ping().await);

        repository.set_should_fail(true).await;
        assert!(matches!(service.ping().await, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_get_user() {
        let service = create_service();
        let created = service.register("alice", "pw1").await.unwrap();

        let found = service.get(created.id()).await.unwrap().unwrap();
        assert_eq!(found.username(), "alice");
    }
}
