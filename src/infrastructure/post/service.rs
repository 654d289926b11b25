//! Post service: public reads and author-only writes

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::domain::post::{
    ensure_author, validate_post_fields, NewPost, Post, PostAction, PostChanges, PostId,
    PostRepository, PostWithAuthor,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_auth_event, AuthEvent};

pub const POST_NOT_FOUND: &str = "Post not found";

/// Title and content as submitted by a client
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl PostInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        validate_post_fields(&self.title, &self.content)
            .map_err(|e| DomainError::validation(e.to_string()))
    }
}

/// Service for post management
pub struct PostService<R: PostRepository> {
    repository: Arc<R>,
}

impl<R: PostRepository> std::fmt::Debug for PostService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostService").finish_non_exhaustive()
    }
}

impl<R: PostRepository> PostService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a post authored by `author`
    pub async fn create(&self, author: UserId, input: PostInput) -> Result<Post, DomainError> {
        input.validate()?;

        self.repository
            .create(NewPost {
                title: input.title,
                content: input.content,
                author_id: author,
                created_at: Utc::now(),
            })
            .await
    }

    /// All posts with author usernames, newest first
    pub async fn list(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        self.repository.list_with_authors().await
    }

    /// Get a post by ID
    pub async fn get(&self, id: PostId) -> Result<Post, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(POST_NOT_FOUND))
    }

    /// Replace a post's title and content on behalf of `requester`
    pub async fn update(
        &self,
        id: PostId,
        requester: UserId,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        input.validate()?;

        let post = self.get(id).await?;
        self.check_author(&post, requester, PostAction::Edit)?;

        // A row that vanished since the fetch reads as never having existed
        self.repository
            .update_owned(
                id,
                requester,
                PostChanges {
                    title: input.title,
                    content: input.content,
                },
            )
            .await?
            .ok_or_else(|| DomainError::not_found(POST_NOT_FOUND))
    }

    /// Delete a post on behalf of `requester`
    pub async fn delete(&self, id: PostId, requester: UserId) -> Result<(), DomainError> {
        let post = self.get(id).await?;
        self.check_author(&post, requester, PostAction::Delete)?;

        if self.repository.delete_owned(id, requester).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(POST_NOT_FOUND))
        }
    }

    fn check_author(
        &self,
        post: &Post,
        requester: UserId,
        action: PostAction,
    ) -> Result<(), DomainError> {
        ensure_author(post, requester, action).inspect_err(|_| {
            warn!(
                post_id = %post.id,
                author_id = %post.author_id,
                requester = %requester,
                action = ?action,
                "Ownership check denied post mutation"
            );
            record_auth_event(AuthEvent::OwnershipDenied);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::MockPostRepository;
    use crate::domain::user::{NewUser, UserRepository};
    use crate::infrastructure::post::InMemoryPostRepository;
    use crate::infrastructure::user::InMemoryUserRepository;
    use mockall::predicate::eq;

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    fn stored_post(id: i64, author: i64) -> Post {
        Post {
            id: PostId::new(id).unwrap(),
            title: "T".to_string(),
            content: "C".to_string(),
            author_id: user(author),
            created_at: Utc::now(),
        }
    }

    async fn in_memory_service() -> (PostService<InMemoryPostRepository>, UserId, UserId) {
        let users = Arc::new(InMemoryUserRepository::new());
        let alice = users.create(NewUser::new("alice", "h")).await.unwrap().id();
        let bob = users.create(NewUser::new("bob", "h")).await.unwrap().id();
        let service = PostService::new(Arc::new(InMemoryPostRepository::new(users)));
        (service, alice, bob)
    }

    #[tokio::test]
    async fn test_create_sets_author_from_identity() {
        let (service, alice, _) = in_memory_service().await;

        let post = service.create(alice, PostInput::new("T", "C")).await.unwrap();
        assert_eq!(post.author_id, alice);
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "C");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (service, alice, _) = in_memory_service().await;

        let result = service.create(alice, PostInput::new(" ", "C")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nul_in_input_is_validation_error() {
        let (service, alice, _) = in_memory_service().await;
        let post = service.create(alice, PostInput::new("T", "C")).await.unwrap();

        let result = service.create(alice, PostInput::new("a\u{0}b", "")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = service
            .update(post.id, alice, PostInput::new("T", "x\u{0}y"))
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        assert_eq!(service.get(post.id).await.unwrap(), post);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let (service, _, _) = in_memory_service().await;

        let err = service.get(PostId::new(1).unwrap()).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: Post not found");
    }

    #[tokio::test]
    async fn test_non_author_update_leaves_post_unchanged() {
        let (service, alice, bob) = in_memory_service().await;
        let post = service.create(alice, PostInput::new("T", "C")).await.unwrap();

        let result = service.update(post.id, bob, PostInput::new("X", "Y")).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));

        assert_eq!(service.get(post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_non_author_delete_leaves_post_in_place() {
        let (service, alice, bob) = in_memory_service().await;
        let post = service.create(alice, PostInput::new("T", "C")).await.unwrap();

        let result = service.delete(post.id, bob).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));

        assert_eq!(service.get(post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_author_update_and_delete() {
        let (service, alice, _) = in_memory_service().await;
        let post = service.create(alice, PostInput::new("T", "C")).await.unwrap();

        let updated = service
            .update(post.id, alice, PostInput::new("T2", "C2"))
            .await
            .unwrap();
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.author_id, alice);
        assert_eq!(updated.created_at, post.created_at);

        service.delete(post.id, alice).await.unwrap();
        assert!(matches!(
            service.get(post.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_forbidden_update_never_reaches_mutation() {
        let mut repo = MockPostRepository::new();
        let post = stored_post(5, 1);
        let returned = post.clone();

        repo.expect_get()
            .with(eq(post.id))
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        repo.expect_update_owned().never();

        let service = PostService::new(Arc::new(repo));
        let result = service.update(post.id, user(2), PostInput::new("X", "Y")).await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_forbidden_delete_never_reaches_mutation() {
        let mut repo = MockPostRepository::new();
        let post = stored_post(5, 1);
        let returned = post.clone();

        repo.expect_get()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        repo.expect_delete_owned().never();

        let service = PostService::new(Arc::new(repo));
        let result = service.delete(post.id, user(2)).await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found_before_ownership() {
        let mut repo = MockPostRepository::new();
        repo.expect_get().returning(|_| Ok(None));
        repo.expect_update_owned().never();
        repo.expect_delete_owned().never();

        let service = PostService::new(Arc::new(repo));
        let id = PostId::new(9).unwrap();

        assert!(matches!(
            service.update(id, user(1), PostInput::new("X", "Y")).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(id, user(1)).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mutation_carries_checked_author() {
        let mut repo = MockPostRepository::new();
        let post = stored_post(5, 1);
        let returned = post.clone();

        repo.expect_get()
            .returning(move |_| Ok(Some(returned.clone())));
        repo.expect_delete_owned()
            .with(eq(post.id), eq(user(1)))
            .times(1)
            .returning(|_, _| Ok(true));

        let service = PostService::new(Arc::new(repo));
        service.delete(post.id, user(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_row_vanishing_after_check_is_not_found() {
        let mut repo = MockPostRepository::new();
        let post = stored_post(5, 1);
        let returned = post.clone();

        repo.expect_get()
            .returning(move |_| Ok(Some(returned.clone())));
        repo.expect_update_owned().returning(|_, _, _| Ok(None));

        let service = PostService::new(Arc::new(repo));
        let result = service.update(post.id, user(1), PostInput::new("X", "Y")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut repo = MockPostRepository::new();
        repo.expect_list_with_authors()
            .returning(|| Err(DomainError::storage("connection refused")));

        let service = PostService::new(Arc::new(repo));
        assert!(matches!(
            service.list().await,
            Err(DomainError::Storage { .. })
        ));
    }
}
