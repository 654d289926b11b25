//! In-memory post repository implementation

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::post::{NewPost, Post, PostChanges, PostId, PostRepository, PostWithAuthor};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::user::InMemoryUserRepository;

#[derive(Debug, Default)]
struct PostTable {
    /// Insertion order is the natural order used for equal timestamps
    rows: Vec<Post>,
    last_id: i64,
}

/// In-memory implementation of PostRepository
///
/// Joins against an in-memory user store the way the SQL backend joins
/// against `users`.
#[derive(Debug, Clone)]
pub struct InMemoryPostRepository {
    table: Arc<RwLock<PostTable>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            table: Arc::new(RwLock::new(PostTable::default())),
            users,
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        if self.users.get(post.author_id).await?.is_none() {
            return Err(DomainError::storage(format!(
                "Author {} does not exist",
                post.author_id
            )));
        }

        let mut table = self.table.write().await;
        table.last_id += 1;

        let created = Post {
            id: PostId::new(table.last_id)?,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: post.created_at,
        };
        table.rows.push(created.clone());

        Ok(created)
    }

    async fn get(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        let mut posts = self.table.read().await.rows.clone();
        // Stable sort: ties stay in insertion order
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut listed = Vec::with_capacity(posts.len());

        for post in posts {
            // Inner join semantics: rows without an author are not listed
            if let Some(author) = self.users.get(post.author_id).await? {
                listed.push(PostWithAuthor {
                    post,
                    author: author.username().to_string(),
                });
            }
        }

        Ok(listed)
    }

    async fn update_owned(
        &self,
        id: PostId,
        author_id: UserId,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError> {
        let mut table = self.table.write().await;

        let Some(post) = table
            .rows
            .iter_mut()
            .find(|p| p.id == id && p.author_id == author_id)
        else {
            return Ok(None);
        };

        post.title = changes.title;
        post.content = changes.content;

        Ok(Some(post.clone()))
    }

    async fn delete_owned(&self, id: PostId, author_id: UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();

        table
            .rows
            .retain(|p| !(p.id == id && p.author_id == author_id));

        Ok(table.rows.len() < before)
    }
}
