//! Author-only mutation rule

use super::entity::Post;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// A state-changing operation on an existing post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Edit,
    Delete,
}

impl PostAction {
    fn verb(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// Require that `requester` wrote `post` before `action` may touch it
pub fn ensure_author(post: &Post, requester: UserId, action: PostAction) -> Result<(), DomainError> {
    if post.is_authored_by(requester) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "You are not authorized to {} this post",
            action.verb()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::PostId;
    use chrono::Utc;

    fn post_by(author: i64) -> Post {
        Post {
            id: PostId::new(1).unwrap(),
            title: "T".to_string(),
            content: "C".to_string(),
            author_id: UserId::new(author).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_allowed() {
        let post = post_by(1);
        assert!(ensure_author(&post, UserId::new(1).unwrap(), PostAction::Edit).is_ok());
        assert!(ensure_author(&post, UserId::new(1).unwrap(), PostAction::Delete).is_ok());
    }

    #[test]
    fn test_other_user_forbidden() {
        let post = post_by(1);
        let err = ensure_author(&post, UserId::new(2).unwrap(), PostAction::Edit).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Forbidden: You are not authorized to edit this post"
        );

        let err = ensure_author(&post, UserId::new(2).unwrap(), PostAction::Delete).unwrap_err();
        assert!(err.to_string().contains("delete this post"));
    }
}
