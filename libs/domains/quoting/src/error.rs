use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuotingError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Access denied to {entity} {key}")]
    AccessDenied { entity: &'static str, key: String },

    #[error("Ambiguous request: {0}")]
    Ambiguous(String),

    #[error("Preset '{key}' is invalid: {reason}")]
    InvalidPreset { key: String, reason: String },

    #[error("Upstream lookup failed: {0}")]
    Upstream(String),

    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

pub type QuotingResult<T> = Result<T, QuotingError>;

impl QuotingError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn access_denied(entity: &'static str, key: impl ToString) -> Self {
        Self::AccessDenied {
            entity,
            key: key.to_string(),
        }
    }

    pub fn invalid_preset(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPreset {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for transient collaborator failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::DeadlineExceeded(_))
    }
}

impl From<validator::ValidationErrors> for QuotingError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_entity() {
        let err = QuotingError::not_found("filament", 42);
        assert_eq!(err.to_string(), "filament not found: 42");

        let err = QuotingError::access_denied("quote", "abc");
        assert_eq!(err.to_string(), "Access denied to quote abc");
    }

    #[test]
    fn test_only_upstream_and_deadline_are_retryable() {
        assert!(QuotingError::Upstream("catalog offline".into()).is_retryable());
        assert!(QuotingError::DeadlineExceeded(Duration::from_millis(5)).is_retryable());
        assert!(!QuotingError::Validation("bad".into()).is_retryable());
        assert!(!QuotingError::Ambiguous("both".into()).is_retryable());
        assert!(!QuotingError::invalid_preset("k", "wrong family").is_retryable());
    }
}
