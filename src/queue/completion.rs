//! Completion signal for a queue
//!
//! Resolves once: `true` when adding was completed and every buffered item
//! was handled, `false` when the queue was disposed first. The handle can be
//! awaited from async code or waited on from plain threads.

use crate::core::sync::{lock_or_recover, recover_wait};
use futures::future::{BoxFuture, FutureExt};
use std::future::IntoFuture;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;

struct CompletionState {
    result: Mutex<Option<bool>>,
    resolved: Condvar,
    watch_tx: watch::Sender<Option<bool>>,
}

/// Cloneable handle on a queue's completion
#[derive(Clone)]
pub struct Completion {
    state: Arc<CompletionState>,
}

impl Completion {
    pub(crate) fn new() -> Self {
        let (watch_tx, _) = watch::channel(None);
        Self {
            state: Arc::new(CompletionState {
                result: Mutex::new(None),
                resolved: Condvar::new(),
                watch_tx,
            }),
        }
    }

    /// Resolve the signal; returns `true` only for the call that resolved it
    pub(crate) fn resolve(&self, drained: bool) -> bool {
        let mut result = lock_or_recover(&self.state.result);
        if result.is_some() {
            return false;
        }
        *result = Some(drained);
        drop(result);

        self.state.resolved.notify_all();
        self.state.watch_tx.send_replace(Some(drained));
        true
    }

    /// The resolved value, if any
    pub fn result(&self) -> Option<bool> {
        *lock_or_recover(&self.state.result)
    }

    pub fn is_resolved(&self) -> bool {
        self.result().is_some()
    }

    /// Block the current thread until resolved
    pub fn wait_blocking(&self) -> bool {
        let mut result = lock_or_recover(&self.state.result);
        loop {
            if let Some(drained) = *result {
                return drained;
            }
            result = recover_wait(self.state.resolved.wait(result));
        }
    }

    /// Block up to `timeout`; `None` if still unresolved
    pub fn wait_timeout(&self, timeout: Duration) -> Option<bool> {
        // A timeout past the end of `Instant` is no timeout at all
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait_blocking());
        };
        let mut result = lock_or_recover(&self.state.result);
        loop {
            if let Some(drained) = *result {
                return Some(drained);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, _) = recover_wait(self.state.resolved.wait_timeout(result, remaining));
            result = guard;
        }
    }

    /// Wait asynchronously until resolved
    pub async fn wait(&self) -> bool {
        let mut rx = self.state.watch_tx.subscribe();
        // Bound so the borrowed watch guard is released before `rx`
        #[allow(clippy::let_and_return)]
        let drained = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.unwrap_or(false),
            // The sender lives in `state`, which `self` keeps alive
            Err(_) => self.result().unwrap_or(false),
        };
        drained
    }
}

impl IntoFuture for Completion {
    type Output = bool;
    type IntoFuture = BoxFuture<'static, bool>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.wait().await }.boxed()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("result", &self.result())
            .finish()
    }
}
