//! Event types for the notification system

use crate::queue::api::QueueException;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueueEventType {
    /// A handler returned an error or panicked
    ItemFailed,
    /// An item was refused because the queue was shutting down
    AddFailed,
    /// `complete_adding` was called for the first time
    AddingCompleted,
    /// Every item was handled after adding completed
    Completed,
    /// The queue was disposed
    Disposed,
}

impl QueueEventType {
    pub fn is_exception(&self) -> bool {
        matches!(self, QueueEventType::ItemFailed | QueueEventType::AddFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueEventType::ItemFailed => "ItemFailed",
            QueueEventType::AddFailed => "AddFailed",
            QueueEventType::AddingCompleted => "AddingCompleted",
            QueueEventType::Completed => "Completed",
            QueueEventType::Disposed => "Disposed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct QueueEvent {
    pub event_type: QueueEventType,
    pub timestamp: SystemTime,
    pub queue_id: String,
    /// Pending items for lifecycle events, abandoned items for `Disposed`
    pub size: Option<usize>,
    pub exception: Option<QueueException>,
}

impl QueueEvent {
    pub fn new(event_type: QueueEventType, queue_id: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            queue_id,
            size: None,
            exception: None,
        }
    }

    pub fn with_size(event_type: QueueEventType, queue_id: String, size: usize) -> Self {
        Self {
            size: Some(size),
            ..Self::new(event_type, queue_id)
        }
    }

    /// Event for a raised exception; the type follows the exception kind
    pub fn from_exception(exception: QueueException) -> Self {
        use crate::queue::api::ExceptionKind;

        let event_type = match exception.kind() {
            ExceptionKind::Handler => QueueEventType::ItemFailed,
            ExceptionKind::Add => QueueEventType::AddFailed,
        };
        Self {
            exception: Some(exception.clone()),
            ..Self::new(event_type, exception.queue_id().to_string())
        }
    }
}

/// Event filter for subscription management
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    ExceptionsOnly,
    LifecycleOnly,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &QueueEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::ExceptionsOnly => event.event_type.is_exception(),
            EventFilter::LifecycleOnly => !event.event_type.is_exception(),
        }
    }
}
