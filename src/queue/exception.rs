//! Exceptions raised asynchronously by a running queue
//!
//! Handler failures and rejected enqueues never surface as a returned error
//! on the thread that caused them. They are wrapped in a [`QueueException`]
//! and delivered to every registered exception handler and to notification
//! subscribers.

use crate::core::sync::lock_or_recover;
use crate::queue::error::BoxError;
use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// What went wrong when the exception was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    /// The item handler returned an error or panicked
    Handler,
    /// An item could not be enqueued because the queue was shutting down
    Add,
}

impl ExceptionKind {
    pub fn message(&self) -> &'static str {
        match self {
            ExceptionKind::Handler => "Exception occurred.",
            ExceptionKind::Add => "Exception occurred when adding item.",
        }
    }
}

/// Error wrapper delivered through the exception event
///
/// The original error is kept as the inner cause and is reachable through
/// [`Error::source`], [`QueueException::inner`] or [`QueueException::inner_as`].
#[derive(Debug, Clone)]
pub struct QueueException {
    kind: ExceptionKind,
    queue_id: String,
    inner: Arc<dyn Error + Send + Sync + 'static>,
}

impl QueueException {
    pub fn new(kind: ExceptionKind, queue_id: impl Into<String>, inner: BoxError) -> Self {
        Self {
            kind,
            queue_id: queue_id.into(),
            inner: Arc::from(inner),
        }
    }

    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    /// Name of the queue that raised the exception
    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }

    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Downcast the inner cause to a concrete error type
    pub fn inner_as<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Display for QueueException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.message())
    }
}

impl Error for QueueException {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Callback invoked for every raised exception
pub type ExceptionCallback = Arc<dyn Fn(&QueueException) + Send + Sync + 'static>;

/// Registered exception callbacks for one queue
#[derive(Default)]
pub(crate) struct ExceptionHandlers {
    callbacks: Mutex<Vec<ExceptionCallback>>,
}

impl ExceptionHandlers {
    pub(crate) fn new(callbacks: Vec<ExceptionCallback>) -> Self {
        Self {
            callbacks: Mutex::new(callbacks),
        }
    }

    pub(crate) fn register(&self, callback: ExceptionCallback) {
        lock_or_recover(&self.callbacks).push(callback);
    }

    pub(crate) fn len(&self) -> usize {
        lock_or_recover(&self.callbacks).len()
    }

    /// Invoke every callback on the current thread
    ///
    /// The list is cloned first so callbacks may register further handlers.
    /// A panicking callback is logged and does not stop the others.
    pub(crate) fn dispatch(&self, exception: &QueueException) {
        let callbacks: Vec<ExceptionCallback> = lock_or_recover(&self.callbacks).clone();

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(exception))).is_err() {
                log::error!(
                    "Exception handler for queue '{}' panicked while handling: {}",
                    exception.queue_id(),
                    exception.inner()
                );
            }
        }
    }
}
