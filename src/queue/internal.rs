//! Shared state behind a producer-consumer queue
//!
//! One mutex guards the buffer together with the lifecycle flags and the
//! busy-worker count, so "drained" can be decided atomically. Two condition
//! variables wake workers (`not_empty`) and blocked producers (`not_full`).
//! Handlers always run outside the lock.

use crate::core::shutdown::CancellationToken;
use crate::core::sync::{handle_condvar_wait, handle_mutex_poison, lock_or_recover, recover_wait};
use crate::notifications::api::{
    EventFilter, EventReceiver, NotificationManager, QueueEvent, QueueEventType,
};
use crate::queue::completion::Completion;
use crate::queue::error::{BoxError, QueueError, QueueResult};
use crate::queue::exception::{ExceptionCallback, ExceptionHandlers, ExceptionKind, QueueException};
use crate::queue::types::{Counters, QueueStats};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Item handler shared by all workers of a queue
pub(crate) type Handler<T> = Arc<dyn Fn(T) -> Result<(), BoxError> + Send + Sync + 'static>;

/// How often a producer blocked with a cancellation token re-checks it
const CANCELLATION_POLL_INTERVAL: Duration = Duration::from_millis(10);

struct BufferState<T> {
    items: VecDeque<T>,
    adding_completed: bool,
    disposed: bool,
    active_workers: usize,
}

impl<T> BufferState<T> {
    fn is_drained(&self) -> bool {
        !self.disposed && self.adding_completed && self.items.is_empty() && self.active_workers == 0
    }
}

/// Result of trying to place an item in the buffer
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Admission {
    Accepted,
    TimedOut,
    Cancelled,
    /// The queue stopped accepting items; carries the reason
    Closed(QueueError),
}

pub(crate) struct QueueInner<T> {
    name: String,
    capacity: Option<usize>,
    state: Mutex<BufferState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    handler: Handler<T>,
    completion: Completion,
    exception_handlers: ExceptionHandlers,
    notifications: Mutex<NotificationManager>,
    counters: Counters,
}

impl<T> QueueInner<T> {
    pub(crate) fn new(
        name: String,
        capacity: Option<usize>,
        handler: Handler<T>,
        exception_callbacks: Vec<ExceptionCallback>,
    ) -> Self {
        Self {
            name,
            capacity,
            state: Mutex::new(BufferState {
                items: VecDeque::new(),
                adding_completed: false,
                disposed: false,
                active_workers: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            handler,
            completion: Completion::new(),
            exception_handlers: ExceptionHandlers::new(exception_callbacks),
            notifications: Mutex::new(NotificationManager::new()),
            counters: Counters::default(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub(crate) fn handler(&self) -> &Handler<T> {
        &self.handler
    }

    pub(crate) fn completion(&self) -> &Completion {
        &self.completion
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.counters
    }

    fn lock_checked(&self) -> QueueResult<MutexGuard<'_, BufferState<T>>> {
        handle_mutex_poison(self.state.lock(), QueueError::synchronisation)
    }

    fn has_room(&self, state: &BufferState<T>) -> bool {
        self.capacity.map_or(true, |cap| state.items.len() < cap)
    }

    /// Place an item in the buffer, waiting for room as allowed
    ///
    /// `deadline` of `None` waits indefinitely; `Some(now)` does not wait.
    /// Returns `Err(Disposed)` only when the queue was already disposed on
    /// entry; shutdown that happens while waiting yields `Admission::Closed`.
    pub(crate) fn admit(
        &self,
        item: T,
        deadline: Option<Instant>,
        cancellation: Option<&CancellationToken>,
    ) -> QueueResult<Admission> {
        let mut state = self.lock_checked()?;
        if state.disposed {
            return Err(QueueError::Disposed);
        }

        loop {
            if state.disposed {
                return Ok(Admission::Closed(QueueError::Disposed));
            }
            if state.adding_completed {
                return Ok(Admission::Closed(QueueError::AddingCompleted));
            }
            if self.has_room(&state) {
                state.items.push_back(item);
                drop(state);
                self.counters.record_enqueued();
                self.not_empty.notify_one();
                return Ok(Admission::Accepted);
            }
            if cancellation.is_some_and(CancellationToken::is_cancelled) {
                return Ok(Admission::Cancelled);
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(Admission::TimedOut);
                    }
                    Some(remaining)
                }
                None => None,
            };
            let wait_for = match (remaining, cancellation) {
                (Some(remaining), Some(_)) => Some(remaining.min(CANCELLATION_POLL_INTERVAL)),
                (None, Some(_)) => Some(CANCELLATION_POLL_INTERVAL),
                (remaining, None) => remaining,
            };

            state = match wait_for {
                Some(duration) => {
                    handle_condvar_wait(
                        self.not_full.wait_timeout(state, duration),
                        QueueError::synchronisation,
                    )?
                    .0
                }
                None => handle_condvar_wait(self.not_full.wait(state), QueueError::synchronisation)?,
            };
        }
    }

    /// Take the next item for a worker, blocking while the buffer is empty
    ///
    /// Returns `None` once the queue is disposed, or adding is complete and
    /// the buffer is empty. A returned item counts the caller as busy until
    /// [`finish_item`](Self::finish_item).
    pub(crate) fn take(&self) -> Option<T> {
        let mut state = lock_or_recover(&self.state);
        loop {
            if state.disposed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                state.active_workers += 1;
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.adding_completed {
                return None;
            }
            state = recover_wait(self.not_empty.wait(state));
        }
    }

    /// Mark a worker idle again; returns `true` if the queue is now drained
    pub(crate) fn finish_item(&self) -> bool {
        let mut state = lock_or_recover(&self.state);
        state.active_workers = state.active_workers.saturating_sub(1);
        state.is_drained()
    }

    /// Stop accepting items; returns `(first_call, drained_now)`
    pub(crate) fn complete_adding(&self) -> QueueResult<(bool, bool)> {
        let mut state = self.lock_checked()?;
        if state.disposed {
            return Err(QueueError::Disposed);
        }
        let first_call = !state.adding_completed;
        state.adding_completed = true;
        let drained = state.is_drained();
        let pending = state.items.len();
        drop(state);

        self.not_empty.notify_all();
        self.not_full.notify_all();

        if first_call {
            self.publish(QueueEvent::with_size(
                QueueEventType::AddingCompleted,
                self.name.clone(),
                pending,
            ));
        }
        Ok((first_call, drained))
    }

    /// Mark the queue disposed and take the abandoned items
    ///
    /// Also reports whether the queue had already drained, decided under the
    /// same lock, so a drain that a worker has not yet announced still
    /// resolves completion `true`. Returns `None` if it was already disposed.
    pub(crate) fn dispose(&self) -> Option<(Vec<T>, bool)> {
        let mut state = lock_or_recover(&self.state);
        if state.disposed {
            return None;
        }
        let drained = state.is_drained();
        state.disposed = true;
        let abandoned: Vec<T> = state.items.drain(..).collect();
        drop(state);

        self.not_empty.notify_all();
        self.not_full.notify_all();
        Some((abandoned, drained))
    }

    pub(crate) fn is_disposed(&self) -> bool {
        lock_or_recover(&self.state).disposed
    }

    pub(crate) fn is_adding_completed(&self) -> bool {
        lock_or_recover(&self.state).adding_completed
    }

    pub(crate) fn pending_count(&self) -> QueueResult<usize> {
        let state = self.lock_checked()?;
        if state.disposed {
            return Err(QueueError::Disposed);
        }
        Ok(state.items.len())
    }

    pub(crate) fn pending_items(&self) -> QueueResult<Vec<T>>
    where
        T: Clone,
    {
        let state = self.lock_checked()?;
        if state.disposed {
            return Err(QueueError::Disposed);
        }
        Ok(state.items.iter().cloned().collect())
    }

    pub(crate) fn stats(&self) -> QueueStats {
        let state = lock_or_recover(&self.state);
        let (pending, active) = (state.items.len(), state.active_workers);
        drop(state);
        self.counters.snapshot(pending, active)
    }

    /// Wrap an error and deliver it to exception handlers and subscribers
    pub(crate) fn raise_exception(&self, kind: ExceptionKind, error: BoxError) {
        match kind {
            ExceptionKind::Handler => self.counters.record_failed(),
            ExceptionKind::Add => self.counters.record_rejected(),
        }

        let exception = QueueException::new(kind, self.name.clone(), error);
        log::warn!(
            "Queue '{}': {} ({})",
            self.name,
            exception,
            exception.inner()
        );

        self.exception_handlers.dispatch(&exception);
        self.publish(QueueEvent::from_exception(exception));
    }

    pub(crate) fn register_exception_handler(&self, callback: ExceptionCallback) {
        self.exception_handlers.register(callback);
    }

    /// Resolve completion and announce a successful drain
    pub(crate) fn resolve_completion(&self, drained: bool) {
        if self.completion.resolve(drained) && drained {
            log::info!("Queue '{}' drained; all items handled", self.name);
            self.publish(QueueEvent::new(QueueEventType::Completed, self.name.clone()));
        }
    }

    pub(crate) fn subscribe(&self, subscriber_id: String, filter: EventFilter) -> EventReceiver {
        let source = format!("queue:{}", self.name);
        lock_or_recover(&self.notifications).subscribe(subscriber_id, filter, source)
    }

    pub(crate) fn unsubscribe(&self, subscriber_id: &str) -> bool {
        lock_or_recover(&self.notifications).unsubscribe(subscriber_id)
    }

    pub(crate) fn publish(&self, event: QueueEvent) {
        if let Err(e) = lock_or_recover(&self.notifications).publish(event) {
            log::debug!("Queue '{}': {}", self.name, e);
        }
    }
}
