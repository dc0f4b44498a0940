//! Validation utilities for queue configuration and CLI arguments

use crate::core::error_handling::ContextualError;

/// A configuration or argument value that failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Validate a bounded capacity setting
///
/// Negative values mean unbounded and map to `None`; zero is rejected.
pub fn validate_capacity(capacity: i64) -> Result<Option<usize>, ValidationError> {
    match capacity {
        0 => Err(ValidationError::new(
            "bounded_capacity must be greater than 0 (use a negative value for unbounded)",
        )),
        c if c < 0 => Ok(None),
        c => usize::try_from(c)
            .map(Some)
            .map_err(|_| ValidationError::new(format!("bounded_capacity {} is too large", c))),
    }
}

/// Validate a queue name used for worker thread names and event sources
pub fn validate_queue_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("queue name cannot be empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::new(format!(
            "queue name '{}' contains control characters",
            name.escape_debug()
        )));
    }
    Ok(())
}
