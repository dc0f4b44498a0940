//! Public API for the queue system
//!
//! External modules should import from here rather than directly from internal modules.
//! See module documentation for complete usage examples and architecture details.

// Queue and producer handles
pub use crate::queue::producer_consumer::{ProducerConsumerQueue, QueueBuilder};
pub use crate::queue::publisher::QueueProducer;

// Completion tracking
pub use crate::queue::completion::Completion;

// Configuration
pub use crate::queue::config::{QueueConfig, DEFAULT_QUEUE_NAME, UNBOUNDED};

// Error handling
pub use crate::queue::error::{BoxError, QueueError, QueueResult};
pub use crate::queue::exception::{ExceptionCallback, ExceptionKind, QueueException};

// Statistics
pub use crate::queue::types::QueueStats;

// Cancellation and event subscription
pub use crate::core::shutdown::CancellationToken;
pub use crate::notifications::api::{EventFilter, EventReceiver, QueueEvent, QueueEventType};
