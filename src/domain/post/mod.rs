//! Post domain
//!
//! Blog posts, the rules for their input, and the author-only mutation rule.

mod entity;
mod ownership;
mod repository;
mod validation;

pub use entity::{NewPost, Post, PostChanges, PostId, PostWithAuthor};
pub use ownership::{ensure_author, PostAction};
pub use repository::PostRepository;
pub use validation::{validate_post_fields, PostValidationError, MAX_TITLE_LENGTH};

#[cfg(test)]
pub use repository::MockPostRepository;
