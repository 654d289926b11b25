//! JWT token generation and validation

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Default token lifetime: one hour
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(user_id: UserId, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            user_id: user_id.value(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }

    /// Expired from the `exp` second onwards
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Why a presented token was not accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no token was presented")]
    Missing,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

/// Configuration for JWT service
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    pub algorithm: Algorithm,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_secs,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Parse a configured HMAC algorithm name
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::configuration(format!(
            "Unsupported token algorithm: {}. Use HS256, HS384 or HS512.",
            other
        ))),
    }
}

/// Token issuing and verification
///
/// Verification is a plain `Result`: a rejected token is an expected outcome,
/// not an exceptional one.
pub trait TokenService: Send + Sync + Debug {
    /// Issue a token for `user_id` valid from now for the configured TTL
    fn issue(&self, user_id: UserId) -> Result<String, DomainError>;

    /// Check signature and expiry, returning the embedded identity
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;

    /// Configured token lifetime in seconds
    fn ttl_secs(&self) -> u64;
}

/// HMAC JWT service keyed by a process-wide secret
///
/// Built once at startup and never mutated; rotating the secret means
/// building a new service, which invalidates every outstanding token.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    /// `config.ttl_secs` checked to fit a timestamp offset
    ttl: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service; an empty secret is rejected
    pub fn new(config: JwtConfig) -> Result<Self, DomainError> {
        if config.secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }

        let ttl = i64::try_from(config.ttl_secs).map_err(|_| {
            DomainError::configuration(format!(
                "Token TTL of {} seconds is out of range",
                config.ttl_secs
            ))
        })?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            config,
            ttl,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Issue a token as if the current time were `now` (Unix seconds)
    pub fn issue_at(&self, user_id: UserId, now: i64) -> Result<String, DomainError> {
        let claims = TokenClaims::new(user_id, now, self.ttl);

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    /// Verify a token as if the current time were `now` (Unix seconds)
    pub fn verify_at(&self, token: &str, now: i64) -> Result<UserId, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify_error)?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        UserId::new(data.claims.user_id)
            .map_err(|_| TokenError::Malformed("userId claim is not a valid id".to_string()))
    }
}

impl TokenService for JwtService {
    fn issue(&self, user_id: UserId) -> Result<String, DomainError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn ttl_secs(&self) -> u64 {
        self.config.ttl_secs
    }
}

fn classify_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(err.to_string()),
    }
}
