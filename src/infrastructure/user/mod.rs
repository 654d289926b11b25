//! User infrastructure module
//!
//! Password hashing with Argon2, the in-memory and PostgreSQL user stores,
//! and the registration/login service built on them.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{UserService, USERNAME_TAKEN};
