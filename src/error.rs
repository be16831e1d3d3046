//! # Crate Error Types
//!
//! Unified error handling for the agent's internal operations. Skill-level
//! failures never propagate this type to callers directly — they are caught
//! at the `Skill::execute` boundary and translated into `{success:false,
//! error}` JSON (see `skill::Skill`). This type exists for the layers
//! underneath: the task store, peer client, and workflow engine.

use thiserror::Error;

/// Crate-wide result alias.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors surfaced by the agent's internal components.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether retrying the underlying operation is plausibly worthwhile.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            AgentError::Transport(e) => e.is_timeout() || e.is_connect(),
            AgentError::Database(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_constructor() {
        let err = AgentError::config("missing db_host");
        assert!(matches!(err, AgentError::Config(_)));
        assert_eq!(err.to_string(), "configuration error: missing db_host");
    }

    #[test]
    fn test_validation_constructor() {
        let err = AgentError::validation("missing field: repository");
        assert_eq!(
            err.to_string(),
            "validation error: missing field: repository"
        );
    }

    #[test]
    fn test_not_found_constructor() {
        let err = AgentError::not_found("task abc-123");
        assert_eq!(err.to_string(), "not found: task abc-123");
    }

    #[test]
    fn test_unauthorized_display() {
        let err = AgentError::Unauthorized;
        assert_eq!(err.to_string(), "unauthorized");
    }

    #[test]
    fn test_internal_not_recoverable() {
        let err = AgentError::internal("unreachable branch");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_validation_not_recoverable() {
        let err = AgentError::validation("bad");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
