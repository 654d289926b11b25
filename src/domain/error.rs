use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Missing credentials or a failed username/password check
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// A bearer token was presented but failed verification
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Verified identity lacks rights on the target resource
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether this error stems from the server side rather than the request
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Internal { .. } | Self::Configuration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Post not found");
        assert_eq!(error.to_string(), "Not found: Post not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Title is required");
        assert_eq!(error.to_string(), "Validation error: Title is required");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("Username already taken");
        assert_eq!(error.to_string(), "Conflict: Username already taken");
    }

    #[test]
    fn test_server_fault_classification() {
        assert!(DomainError::storage("connection reset").is_server_fault());
        assert!(DomainError::internal("join error").is_server_fault());
        assert!(!DomainError::forbidden("not yours").is_server_fault());
        assert!(!DomainError::invalid_token("expired").is_server_fault());
    }
}
