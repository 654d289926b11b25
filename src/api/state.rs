//! Application state for shared services

use std::sync::Arc;

use crate::domain::post::{Post, PostId, PostRepository, PostWithAuthor};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::TokenService;
use crate::infrastructure::post::{PostInput, PostService};
use crate::infrastructure::user::{PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
///
/// Built once at startup; every request sees the same instances.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub post_service: Arc<dyn PostServiceTrait>,
    pub token_service: Arc<dyn TokenService>,
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        post_service: Arc<dyn PostServiceTrait>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            user_service,
            post_service,
            token_service,
        }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError>;
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<User>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
    /// Work done once before serving traffic
    async fn prepare(&self) -> Result<(), DomainError>;
}

/// Trait for post service operations
#[async_trait::async_trait]
pub trait PostServiceTrait: Send + Sync {
    async fn create(&self, author: UserId, input: PostInput) -> Result<Post, DomainError>;
    async fn list(&self) -> Result<Vec<PostWithAuthor>, DomainError>;
    async fn get(&self, id: PostId) -> Result<Post, DomainError>;
    async fn update(&self, id: PostId, requester: UserId, input: PostInput)
        -> Result<Post, DomainError>;
    async fn delete(&self, id: PostId, requester: UserId) -> Result<(), DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        UserService::register(self, username, password).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        UserService::ping(self).await
    }

    async fn prepare(&self) -> Result<(), DomainError> {
        UserService::prepare(self).await
    }
}

#[async_trait::async_trait]
impl<R: PostRepository + 'static> PostServiceTrait for PostService<R> {
    async fn create(&self, author: UserId, input: PostInput) -> Result<Post, DomainError> {
        PostService::create(self, author, input).await
    }

    async fn list(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        PostService::list(self).await
    }

    async fn get(&self, id: PostId) -> Result<Post, DomainError> {
        PostService::get(self, id).await
    }

    async fn update(
        &self,
        id: PostId,
        requester: UserId,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        PostService::update(self, id, requester, input).await
    }

    async fn delete(&self, id: PostId, requester: UserId) -> Result<(), DomainError> {
        PostService::delete(self, id, requester).await
    }
}
