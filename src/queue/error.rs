//! Queue Error Types

use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;

/// Boxed error returned by item handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Queue has been disposed")]
    Disposed,

    #[error("Add operation was cancelled")]
    Cancelled,

    #[error("Queue is no longer accepting items")]
    AddingCompleted,

    #[error("Handler panicked: {message}")]
    HandlerPanicked { message: String },

    #[error("Synchronisation failure: {message}")]
    Synchronisation { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

impl QueueError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        QueueError::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn synchronisation(message: String) -> Self {
        QueueError::Synchronisation { message }
    }
}

impl From<ValidationError> for QueueError {
    fn from(err: ValidationError) -> Self {
        QueueError::InvalidArgument {
            message: err.message().to_string(),
        }
    }
}

impl ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, QueueError::InvalidArgument { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueError::InvalidArgument { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
