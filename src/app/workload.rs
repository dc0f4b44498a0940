//! Synthetic workload driven through the queue by the demo binary

use crate::app::cli::args::Args;
use crate::core::shutdown::CancellationToken;
use crate::queue::api::{BoxError, QueueError, QueueProducer, QueueResult};
use std::time::Duration;

/// Error returned by the handler for items chosen to fail
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("synthetic failure on item {id}")]
pub struct SyntheticFailure {
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub items: usize,
    pub producers: usize,
    pub work: Duration,
    pub fail_every: Option<usize>,
}

impl Workload {
    pub fn from_args(args: &Args) -> Self {
        Self {
            items: args.item_count(),
            producers: args.producer_count().max(1),
            work: args.work_duration(),
            fail_every: args.fail_every(),
        }
    }

    /// Handler that sleeps for the configured work time; every Nth item fails
    pub fn handler(&self) -> impl Fn(usize) -> Result<(), BoxError> + Send + Sync + 'static {
        let work = self.work;
        let fail_every = self.fail_every;

        move |id: usize| {
            if !work.is_zero() {
                std::thread::sleep(work);
            }
            if fail_every.is_some_and(|n| (id + 1) % n == 0) {
                return Err(SyntheticFailure { id }.into());
            }
            log::trace!("Handled item {}", id);
            Ok(())
        }
    }

    /// Item ids for producer `index`, striped across all producers
    pub fn items_for(&self, index: usize) -> impl Iterator<Item = usize> {
        (index..self.items).step_by(self.producers.max(1))
    }

    pub fn expected_failures(&self) -> usize {
        self.fail_every.map_or(0, |n| self.items / n)
    }
}

/// Feed `ids` into the queue until done or cancelled; returns items accepted
///
/// Blocks on a full queue, so run it on a blocking thread.
pub fn produce(
    producer: QueueProducer<usize>,
    ids: impl Iterator<Item = usize>,
    token: CancellationToken,
) -> QueueResult<usize> {
    let mut accepted = 0;
    for id in ids {
        if token.is_cancelled() {
            break;
        }
        match producer.add_with_cancellation(id, &token) {
            Ok(()) => accepted += 1,
            Err(QueueError::Cancelled) => break,
            Err(QueueError::Disposed) if token.is_cancelled() => break,
            Err(e) => return Err(e),
        }
    }
    Ok(accepted)
}
