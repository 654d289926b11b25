//! User domain
//!
//! Account types, the credential policy applied at registration and the
//! repository seam for the user table.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;
pub use validation::{normalize_username, CredentialPolicy, UserValidationError};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
