//! Enqueue operations and the detachable producer handle
//!
//! Producers never see an error for an item refused during shutdown: the
//! refusal is reported through the exception event instead. Only misuse
//! (touching a disposed queue) and caller-driven cancellation are returned.

use crate::core::shutdown::CancellationToken;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::exception::ExceptionKind;
use crate::queue::internal::{Admission, QueueInner};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

impl<T> QueueInner<T> {
    /// Blocking enqueue shared by the queue and its producer handles
    pub(crate) fn add_item(
        &self,
        item: T,
        cancellation: Option<&CancellationToken>,
    ) -> QueueResult<()> {
        match self.admit(item, None, cancellation)? {
            Admission::Accepted => Ok(()),
            Admission::Cancelled => Err(QueueError::Cancelled),
            Admission::Closed(cause) => {
                self.raise_exception(ExceptionKind::Add, Box::new(cause));
                Ok(())
            }
            Admission::TimedOut => {
                debug_assert!(false, "admission without a deadline timed out");
                Err(QueueError::OperationFailed {
                    message: "enqueue timed out without a deadline".to_string(),
                })
            }
        }
    }

    /// Bounded-wait enqueue; `None` does not wait at all
    ///
    /// A timeout too large to express as an `Instant` waits without a deadline.
    pub(crate) fn try_add_item(&self, item: T, timeout: Option<Duration>) -> QueueResult<bool> {
        let deadline = Instant::now().checked_add(timeout.unwrap_or(Duration::ZERO));
        match self.admit(item, deadline, None)? {
            Admission::Accepted => Ok(true),
            Admission::TimedOut | Admission::Cancelled => Ok(false),
            Admission::Closed(cause) => {
                self.raise_exception(ExceptionKind::Add, Box::new(cause));
                Ok(false)
            }
        }
    }
}

/// Cloneable handle for feeding a queue from other threads
///
/// The handle does not keep the queue alive. Once the owning
/// [`ProducerConsumerQueue`](crate::queue::api::ProducerConsumerQueue) is
/// disposed or dropped, every operation returns [`QueueError::Disposed`].
///
/// # Example
///
/// ```rust,no_run
/// # use pcqueue::queue::api::ProducerConsumerQueue;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = ProducerConsumerQueue::new(|n: u64| { println!("{n}"); Ok(()) }, 2, Some(16))?;
///
/// let producers: Vec<_> = (0..4)
///     .map(|p| {
///         let producer = queue.producer();
///         std::thread::spawn(move || {
///             for i in 0..100 {
///                 producer.add(p * 1000 + i).expect("queue alive");
///             }
///         })
///     })
///     .collect();
///
/// for handle in producers {
///     handle.join().unwrap();
/// }
/// queue.complete_adding()?;
/// assert!(queue.completion().wait_blocking());
/// # Ok(())
/// # }
/// ```
pub struct QueueProducer<T> {
    inner: Weak<QueueInner<T>>,
}

impl<T> Clone for QueueProducer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> QueueProducer<T> {
    pub(crate) fn new(inner: &Arc<QueueInner<T>>) -> Self {
        Self {
            inner: Arc::downgrade(inner),
        }
    }

    fn upgrade(&self) -> QueueResult<Arc<QueueInner<T>>> {
        self.inner.upgrade().ok_or(QueueError::Disposed)
    }

    /// Name of the queue this handle feeds
    pub fn queue_name(&self) -> Option<String> {
        self.inner.upgrade().map(|inner| inner.name().to_string())
    }

    pub fn add(&self, item: T) -> QueueResult<()> {
        self.upgrade()?.add_item(item, None)
    }

    pub fn add_with_cancellation(
        &self,
        item: T,
        cancellation: &CancellationToken,
    ) -> QueueResult<()> {
        self.upgrade()?.add_item(item, Some(cancellation))
    }

    pub fn try_add(&self, item: T) -> QueueResult<bool> {
        self.upgrade()?.try_add_item(item, None)
    }

    pub fn try_add_timeout(&self, item: T, timeout: Duration) -> QueueResult<bool> {
        self.upgrade()?.try_add_item(item, Some(timeout))
    }
}

impl<T> std::fmt::Debug for QueueProducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueProducer")
            .field("queue", &self.queue_name())
            .finish()
    }
}
