//! Generic error handling utilities
//!
//! Provides unified error reporting across the queue, notification and CLI
//! error types while keeping user-facing output short.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns `false`,
/// `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the user can act on,
    /// such as an invalid worker count or a malformed config file.
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors show their own message; system errors show the
/// operation context. Full details always go to debug level.
///
/// # Examples
/// ```rust,no_run
/// # use pcqueue::core::error_handling::log_error_with_context;
/// # use pcqueue::core::validation::ValidationError;
/// let err = ValidationError::new("max_concurrency_level must be greater than 0");
/// log_error_with_context(&err, "Queue configuration");
/// // Logs: "FATAL: max_concurrency_level must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Render the line shown on stderr for an error that ends the program
pub fn user_facing_message<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => format!("Error: {}", user_msg),
        _ => format!("Error: {} failed ({})", operation_context, error),
    }
}
