//! Credential policy applied to new accounts

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during credential validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Username is required")]
    EmptyUsername,

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username contains invalid character: {0:?}. Whitespace and control characters are not allowed")]
    InvalidUsernameCharacter(char),

    #[error("Password is required")]
    EmptyPassword,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

/// Length bounds for usernames and passwords, counted in characters
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialPolicy {
    pub min_username_length: usize,
    pub max_username_length: usize,
    pub min_password_length: usize,
    pub max_password_length: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            min_username_length: 1,
            max_username_length: 50,
            min_password_length: 1,
            max_password_length: 128,
        }
    }
}

impl CredentialPolicy {
    /// Validate an already-normalized username
    ///
    /// Rules:
    /// - Cannot be empty
    /// - Length within the configured bounds
    /// - No whitespace or control characters
    pub fn validate_username(&self, username: &str) -> Result<(), UserValidationError> {
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let len = username.chars().count();

        if len < self.min_username_length {
            return Err(UserValidationError::UsernameTooShort(self.min_username_length));
        }

        if len > self.max_username_length {
            return Err(UserValidationError::UsernameTooLong(self.max_username_length));
        }

        if let Some(c) = username
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(UserValidationError::InvalidUsernameCharacter(c));
        }

        Ok(())
    }

    /// Validate a password. Passwords are never trimmed.
    pub fn validate_password(&self, password: &str) -> Result<(), UserValidationError> {
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }

        let len = password.chars().count();

        if len < self.min_password_length {
            return Err(UserValidationError::PasswordTooShort(self.min_password_length));
        }

        if len > self.max_password_length {
            return Err(UserValidationError::PasswordTooLong(self.max_password_length));
        }

        Ok(())
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_string()
}
