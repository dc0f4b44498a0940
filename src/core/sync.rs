//! Synchronization utilities for robust mutex handling
//!
//! This module provides utilities for handling mutex poisoning in a consistent
//! manner across the codebase. Public queue operations convert poison into a
//! domain error; worker loops recover the guard and keep going. Handlers never
//! run while the buffer lock is held.

use std::sync::{LockResult, Mutex, MutexGuard, PoisonError};

/// Handle poisoned mutex cases with consistent error handling
///
/// This utility function converts mutex poison errors into application-specific
/// errors using a provided error constructor.
///
/// # Arguments
/// * `result` - The result from a mutex lock operation
/// * `error_constructor` - Function to create the appropriate error type
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use pcqueue::core::sync::handle_mutex_poison;
/// use pcqueue::queue::api::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| QueueError::Synchronisation { message }
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {}",
            poison_err
        ))
    })
}

/// Handle poisoned condition variable waits
///
/// `Condvar::wait` and `Condvar::wait_timeout` hand the guard back inside the
/// `LockResult`; this maps the poisoned case the same way as
/// [`handle_mutex_poison`].
pub fn handle_condvar_wait<G, E>(
    result: LockResult<G>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<G, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (condition variable wait poisoned). PoisonError: {}",
            poison_err
        ))
    })
}

/// Lock a mutex, recovering the guard if a previous holder panicked
pub fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Unwrap a condvar wait result, recovering the guard if poisoned
pub fn recover_wait<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(PoisonError::into_inner)
}
