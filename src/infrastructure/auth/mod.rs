//! Authentication infrastructure module
//!
//! Stateless signed tokens binding a user id to an expiry.

mod jwt;

pub use jwt::{parse_algorithm, JwtConfig, JwtService, TokenClaims, TokenError, TokenService};
