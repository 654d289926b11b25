//! Domain layer - Accounts, posts and the rules that bind them

pub mod error;
pub mod post;
pub mod user;

pub use error::DomainError;
pub use post::{NewPost, Post, PostChanges, PostId, PostRepository, PostWithAuthor};
pub use user::{CredentialPolicy, NewUser, User, UserId, UserRepository};
