use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Single structured error shape for storage, configuration and I/O faults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Expected, recoverable outcomes of a lifecycle operation.
///
/// These are returned as values; none of them indicates a fault in the desk itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("malformed incident code {0:?}; expected DD/MM/YYYY-HH:MM-N")]
    InvalidFormat(String),

    #[error("incident {0} not found")]
    NotFound(String),

    #[error("cannot modify resolved incident {0}")]
    InvalidState(String),

    #[error("incident {0} is already resolved")]
    AlreadyResolved(String),

    #[error("incident {0} is already deleted")]
    AlreadyDeleted(String),

    #[error("incident {0} is not resolved")]
    NotResolved(String),
}

impl LifecycleError {
    /// Stable machine-readable code, in the same namespace as [`AppError::code`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "INCIDENT_INVALID_FORMAT",
            Self::NotFound(_) => "INCIDENT_NOT_FOUND",
            Self::InvalidState(_) => "INCIDENT_INVALID_STATE",
            Self::AlreadyResolved(_) => "INCIDENT_ALREADY_RESOLVED",
            Self::AlreadyDeleted(_) => "INCIDENT_ALREADY_DELETED",
            Self::NotResolved(_) => "INCIDENT_NOT_RESOLVED",
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::new(err.code(), err.to_string())
    }
}
