//! ProducerConsumerQueue - bounded queue drained by a fixed worker pool
//!
//! The queue owns its worker threads. Producers enqueue through the queue
//! itself or through detached [`QueueProducer`] handles; workers hand every
//! item to the shared handler exactly once.

use crate::core::shutdown::CancellationToken;
use crate::core::sync::lock_or_recover;
use crate::core::validation::validate_queue_name;
use crate::notifications::api::{EventFilter, EventReceiver, QueueEvent, QueueEventType};
use crate::queue::completion::Completion;
use crate::queue::config::{QueueConfig, DEFAULT_QUEUE_NAME};
use crate::queue::consumer::run_worker;
use crate::queue::error::{BoxError, QueueError, QueueResult};
use crate::queue::exception::{ExceptionCallback, QueueException};
use crate::queue::internal::{Handler, QueueInner};
use crate::queue::publisher::QueueProducer;
use crate::queue::types::QueueStats;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Bounded producer-consumer queue with a fixed pool of worker threads
///
/// # Example
///
/// ```rust,no_run
/// use pcqueue::queue::api::{EventFilter, ProducerConsumerQueue};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = ProducerConsumerQueue::builder()
///     .name("resize")
///     .max_concurrency_level(4)
///     .bounded_capacity(64)
///     .handler(|path: String| {
///         println!("resizing {path}");
///         Ok(())
///     })
///     .on_exception(|ex| eprintln!("{}: {}", ex, ex.inner()))
///     .build()?;
///
/// queue.add("a.png".to_string())?;
/// if !queue.try_add_timeout("b.png".to_string(), std::time::Duration::from_millis(50))? {
///     eprintln!("queue is full");
/// }
///
/// queue.complete_adding()?;
/// let drained = queue.completion().wait_blocking();
/// assert!(drained);
/// # Ok(())
/// # }
/// ```
pub struct ProducerConsumerQueue<T: Send + 'static> {
    inner: Arc<QueueInner<T>>,
    max_concurrency_level: usize,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Send + 'static> ProducerConsumerQueue<T> {
    pub fn builder() -> QueueBuilder<T> {
        QueueBuilder::new()
    }

    /// Create a queue and start `max_concurrency_level` workers
    ///
    /// `bounded_capacity` of `None` means unbounded.
    pub fn new<F>(
        handler: F,
        max_concurrency_level: usize,
        bounded_capacity: Option<usize>,
    ) -> QueueResult<Self>
    where
        F: Fn(T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let mut builder = Self::builder()
            .handler(handler)
            .max_concurrency_level(max_concurrency_level);
        if let Some(capacity) = bounded_capacity {
            builder = builder.bounded_capacity(capacity);
        }
        builder.build()
    }

    /// Create a queue from a validated [`QueueConfig`]
    pub fn with_config<F>(config: &QueueConfig, handler: F) -> QueueResult<Self>
    where
        F: Fn(T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        config.validate()?;
        let mut builder = Self::builder()
            .name(config.name.clone())
            .max_concurrency_level(config.max_concurrency_level)
            .handler(handler);
        if let Some(capacity) = config.capacity()? {
            builder = builder.bounded_capacity(capacity);
        }
        builder.build()
    }

    fn start(inner: Arc<QueueInner<T>>, max_concurrency_level: usize) -> QueueResult<Self> {
        let mut workers = Vec::with_capacity(max_concurrency_level);

        for worker_index in 0..max_concurrency_level {
            let worker_inner = Arc::clone(&inner);
            let spawned = thread::Builder::new()
                .name(format!("{}-worker-{}", inner.name(), worker_index))
                .spawn(move || run_worker(worker_inner, worker_index));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    inner.dispose();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(QueueError::OperationFailed {
                        message: format!("failed to spawn worker {}: {}", worker_index, e),
                    });
                }
            }
        }

        log::debug!(
            "Queue '{}' started with {} worker(s), capacity {}",
            inner.name(),
            max_concurrency_level,
            inner
                .capacity()
                .map_or_else(|| "unbounded".to_string(), |c| c.to_string())
        );

        Ok(Self {
            inner,
            max_concurrency_level,
            workers: Mutex::new(workers),
        })
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Configured bound, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.inner.capacity()
    }

    pub fn max_concurrency_level(&self) -> usize {
        self.max_concurrency_level
    }

    /// Enqueue, blocking while the queue is full
    ///
    /// If the queue stops accepting items (adding completed or disposed
    /// while waiting) the item is dropped, an `Add` exception is raised and
    /// `Ok(())` is returned. Fails with [`QueueError::Disposed`] only when the
    /// queue was already disposed.
    pub fn add(&self, item: T) -> QueueResult<()> {
        self.inner.add_item(item, None)
    }

    /// As [`add`](Self::add), abandoning the wait when `cancellation` fires
    pub fn add_with_cancellation(&self, item: T, cancellation: &CancellationToken) -> QueueResult<()> {
        self.inner.add_item(item, Some(cancellation))
    }

    /// Enqueue only if there is room right now
    pub fn try_add(&self, item: T) -> QueueResult<bool> {
        self.inner.try_add_item(item, None)
    }

    /// Enqueue, waiting at most `timeout` for room
    pub fn try_add_timeout(&self, item: T, timeout: Duration) -> QueueResult<bool> {
        self.inner.try_add_item(item, Some(timeout))
    }

    /// Stop accepting items and let workers drain the buffer
    ///
    /// Safe to call more than once.
    pub fn complete_adding(&self) -> QueueResult<()> {
        let (first_call, drained) = self.inner.complete_adding()?;
        if first_call {
            log::debug!("Queue '{}' no longer accepting items", self.name());
        }
        if drained {
            self.inner.resolve_completion(true);
        }
        Ok(())
    }

    pub fn completion(&self) -> Completion {
        self.inner.completion().clone()
    }

    pub fn pending_count(&self) -> QueueResult<usize> {
        self.inner.pending_count()
    }

    /// Snapshot of the items not yet picked up by a worker, in FIFO order
    pub fn pending_items(&self) -> QueueResult<Vec<T>>
    where
        T: Clone,
    {
        self.inner.pending_items()
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.stats()
    }

    pub fn is_adding_completed(&self) -> bool {
        self.inner.is_adding_completed()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Register a callback for handler failures and refused items
    ///
    /// Callbacks run on the thread that raised the exception.
    pub fn on_exception<F>(&self, callback: F)
    where
        F: Fn(&QueueException) + Send + Sync + 'static,
    {
        self.inner.register_exception_handler(Arc::new(callback));
    }

    /// Subscribe to queue events over a channel
    pub fn subscribe(&self, subscriber_id: impl Into<String>, filter: EventFilter) -> EventReceiver {
        self.inner.subscribe(subscriber_id.into(), filter)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.inner.unsubscribe(subscriber_id)
    }

    /// Detached handle for producers on other threads
    pub fn producer(&self) -> QueueProducer<T> {
        QueueProducer::new(&self.inner)
    }

    /// Stop the queue, abandoning items not yet picked up by a worker
    ///
    /// Completion resolves `false` unless the queue had already drained,
    /// in which case it resolves `true`.
    /// Waits for in-flight handlers to return. Idempotent.
    pub fn dispose(&self) {
        let Some((abandoned, drained)) = self.inner.dispose() else {
            return;
        };
        let abandoned_count = abandoned.len();
        drop(abandoned);

        self.inner.counters().record_abandoned(abandoned_count);
        self.inner.resolve_completion(drained);
        log::info!(
            "Queue '{}' disposed; {} pending item(s) abandoned",
            self.name(),
            abandoned_count
        );
        self.inner.publish(QueueEvent::with_size(
            QueueEventType::Disposed,
            self.name().to_string(),
            abandoned_count,
        ));

        let current = thread::current().id();
        let workers = std::mem::take(&mut *lock_or_recover(&self.workers));
        for handle in workers {
            // Disposed from inside a handler: that worker exits on its own
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                log::error!("Queue '{}': worker thread panicked", self.name());
            }
        }
    }
}

impl<T: Send + 'static> Drop for ProducerConsumerQueue<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Send + 'static> std::fmt::Debug for ProducerConsumerQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerConsumerQueue")
            .field("name", &self.name())
            .field("capacity", &self.capacity())
            .field("max_concurrency_level", &self.max_concurrency_level)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Builder for [`ProducerConsumerQueue`]
pub struct QueueBuilder<T> {
    name: String,
    handler: Option<Handler<T>>,
    max_concurrency_level: usize,
    bounded_capacity: Option<usize>,
    exception_callbacks: Vec<ExceptionCallback>,
}

impl<T: Send + 'static> Default for QueueBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> QueueBuilder<T> {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_QUEUE_NAME.to_string(),
            handler: None,
            max_concurrency_level: 1,
            bounded_capacity: None,
            exception_callbacks: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn max_concurrency_level(mut self, level: usize) -> Self {
        self.max_concurrency_level = level;
        self
    }

    pub fn bounded_capacity(mut self, capacity: usize) -> Self {
        self.bounded_capacity = Some(capacity);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.bounded_capacity = None;
        self
    }

    /// Register an exception callback before any worker starts
    pub fn on_exception<F>(mut self, callback: F) -> Self
    where
        F: Fn(&QueueException) + Send + Sync + 'static,
    {
        self.exception_callbacks.push(Arc::new(callback));
        self
    }

    pub fn build(self) -> QueueResult<ProducerConsumerQueue<T>> {
        let handler = self
            .handler
            .ok_or_else(|| QueueError::invalid_argument("a handler is required"))?;
        if self.max_concurrency_level == 0 {
            return Err(QueueError::invalid_argument(
                "max_concurrency_level must be greater than 0",
            ));
        }
        if self.bounded_capacity == Some(0) {
            return Err(QueueError::invalid_argument(
                "bounded_capacity must be greater than 0",
            ));
        }
        validate_queue_name(&self.name)?;

        let inner = Arc::new(QueueInner::new(
            self.name,
            self.bounded_capacity,
            handler,
            self.exception_callbacks,
        ));
        ProducerConsumerQueue::start(inner, self.max_concurrency_level)
    }
}
