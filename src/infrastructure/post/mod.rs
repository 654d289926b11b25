//! Post infrastructure module
//!
//! In-memory and PostgreSQL post stores and the service enforcing
//! author-only mutations.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresPostRepository;
pub use repository::InMemoryPostRepository;
pub use service::{PostInput, PostService, POST_NOT_FOUND};
