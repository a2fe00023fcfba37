use thiserror::Error;

use crate::domain::AgentId;

/// Main error type for the simulator
#[derive(Error, Debug)]
pub enum SimError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Boundary validation (name, balance, goal text)
    #[error("Validation failed: {0}")]
    Validation(String),

    // Strategy provider unreachable or returned a malformed payload
    #[error("Strategy generation failed: {0}")]
    Generation(String),

    // Lifecycle errors
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SimError {
    /// Whether the caller can offer the user a retry for this failure
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::Generation(_) | SimError::Http(_) | SimError::Validation(_)
        )
    }
}

/// Result type alias for SimError
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::Generation("missing riskLevel".into());
        assert_eq!(err.to_string(), "Strategy generation failed: missing riskLevel");

        let err = SimError::Validation("Agent name is required.".into());
        assert_eq!(err.to_string(), "Validation failed: Agent name is required.");
    }

    #[test]
    fn test_recoverable() {
        assert!(SimError::Generation("timeout".into()).is_recoverable());
        assert!(!SimError::Cancelled.is_recoverable());
        assert!(!SimError::AgentNotFound(AgentId::new()).is_recoverable());
    }
}
