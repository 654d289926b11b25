//! Post input validation

use thiserror::Error;

/// Matches the `posts.title` column width
pub const MAX_TITLE_LENGTH: usize = 255;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PostValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title exceeds maximum length of {0} characters")]
    TitleTooLong(usize),

    /// PostgreSQL text columns cannot hold NUL
    #[error("{0} must not contain NUL characters")]
    NulCharacter(&'static str),
}

/// Title must be non-blank and fit the column; content is free-form
/// apart from NUL, which neither field may contain.
pub fn validate_post_fields(title: &str, content: &str) -> Result<(), PostValidationError> {
    if title.contains('\0') {
        return Err(PostValidationError::NulCharacter("Title"));
    }

    if content.contains('\0') {
        return Err(PostValidationError::NulCharacter("Content"));
    }

    if title.trim().is_empty() {
        return Err(PostValidationError::EmptyTitle);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(PostValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(())
}
