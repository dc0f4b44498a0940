//! Worker loop for queue consumers
//!
//! Each worker thread pulls items until the queue is drained or disposed.
//! Handler failures, including panics, are contained per item and reported
//! through the queue's exception event.

use crate::queue::error::{BoxError, QueueError};
use crate::queue::exception::ExceptionKind;
use crate::queue::internal::{Handler, QueueInner};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Run one worker until there is nothing left to take
pub(crate) fn run_worker<T>(inner: Arc<QueueInner<T>>, worker_index: usize) {
    log::debug!("Worker {} started for queue '{}'", worker_index, inner.name());

    while let Some(item) = inner.take() {
        match invoke_guarded(inner.handler(), item) {
            Ok(()) => inner.counters().record_processed(),
            Err(error) => inner.raise_exception(ExceptionKind::Handler, error),
        }

        if inner.finish_item() {
            inner.resolve_completion(true);
        }
    }

    log::debug!("Worker {} stopped for queue '{}'", worker_index, inner.name());
}

/// Call the handler, turning a panic into an error
fn invoke_guarded<T>(handler: &Handler<T>, item: T) -> Result<(), BoxError> {
    match catch_unwind(AssertUnwindSafe(|| handler(item))) {
        Ok(result) => result,
        Err(payload) => Err(Box::new(QueueError::HandlerPanicked {
            message: panic_message(payload.as_ref()),
        })),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
