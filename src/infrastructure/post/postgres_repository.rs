//! PostgreSQL post repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::post::{NewPost, Post, PostChanges, PostId, PostRepository, PostWithAuthor};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const POST_COLUMNS: &str = "id, title, content, author_id, created_at";

/// PostgreSQL implementation of PostRepository
///
/// Each method is a single statement on a pooled connection; the ownership
/// condition lives in the WHERE clause of the mutating statements.
#[derive(Debug, Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let query = format!(
            "INSERT INTO posts (title, content, author_id, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            POST_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.author_id.value())
            .bind(post.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create post: {}", e)))?;

        row_to_post(&row)
    }

    async fn get(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get post: {}", e)))?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT posts.id, posts.title, posts.content, posts.created_at, posts.author_id,
                   users.username AS author
            FROM posts
            JOIN users ON posts.author_id = users.id
            ORDER BY posts.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list posts: {}", e)))?;

        let mut posts = Vec::with_capacity(rows.len());

        for row in rows {
            let author: String = row
                .try_get("author")
                .map_err(|e| DomainError::storage(format!("Failed to read author: {}", e)))?;
            posts.push(PostWithAuthor {
                post: row_to_post(&row)?,
                author,
            });
        }

        Ok(posts)
    }

    async fn update_owned(
        &self,
        id: PostId,
        author_id: UserId,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError> {
        let query = format!(
            "UPDATE posts SET title = $1, content = $2 \
             WHERE id = $3 AND author_id = $4 RETURNING {}",
            POST_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&changes.title)
            .bind(&changes.content)
            .bind(id.value())
            .bind(author_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update post: {}", e)))?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn delete_owned(&self, id: PostId, author_id: UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id.value())
            .bind(author_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete post: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_post(row: &PgRow) -> Result<Post, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Failed to read post row: {}", e));

    let id: i64 = row.try_get("id").map_err(read)?;
    let title: String = row.try_get("title").map_err(read)?;
    let content: String = row.try_get("content").map_err(read)?;
    let author_id: i64 = row.try_get("author_id").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(Post {
        id: PostId::new(id)
            .map_err(|e| DomainError::storage(format!("Invalid post ID in database: {}", e)))?,
        title,
        content,
        author_id: UserId::new(author_id)
            .map_err(|e| DomainError::storage(format!("Invalid author ID in database: {}", e)))?,
        created_at,
    })
}
