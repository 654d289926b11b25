//! Post repository trait

use async_trait::async_trait;

use super::entity::{NewPost, Post, PostChanges, PostId, PostWithAuthor};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository for post persistence
///
/// The `*_owned` mutations carry the author id the caller already checked and
/// only touch a row still matching both id and author.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post, assigning its id
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;

    /// Finds a post by ID
    async fn get(&self, id: PostId) -> Result<Option<Post>, DomainError>;

    /// All posts with their author's username, newest first
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, DomainError>;

    /// Replace title and content; `None` when no row matched
    async fn update_owned(
        &self,
        id: PostId,
        author_id: UserId,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError>;

    /// Remove the post; `false` when no row matched
    async fn delete_owned(&self, id: PostId, author_id: UserId) -> Result<bool, DomainError>;
}
