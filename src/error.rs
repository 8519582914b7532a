use thiserror::Error;

/// Result type for task infrastructure operations
pub type TaskResult<T> = Result<T, TaskError>;

/// Infrastructure errors for registration, enqueueing and transport
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    #[error("Task '{name}' is already registered in namespace '{namespace}'")]
    DuplicateTaskName { namespace: String, name: String },

    #[error("No task registered with the name '{name}' in namespace '{namespace}'")]
    UnknownTask { namespace: String, name: String },

    #[error("Namespace already registered: {0}")]
    DuplicateNamespace(String),

    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("Task execution failed: {0}")]
    ExecutionFailed(#[from] ExecutionError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Task execution outcome - determines log severity, not the retry
/// decision, which is attempt-count-only
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    /// Transient failure - the task asks to be evaluated against its
    /// retry policy
    #[error("Retryable error: {0}")]
    Retryable(String),

    /// Unrecoverable failure - flows through the same retry decision but
    /// is logged at error severity
    #[error("Permanent error: {0}")]
    Permanent(String),
}

impl ExecutionError {
    /// Create a retryable error
    pub fn retryable(msg: impl Into<String>) -> Self {
        Self::Retryable(msg.into())
    }

    /// Create a permanent error
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            Self::Retryable(msg) | Self::Permanent(msg) => msg,
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
