//! Public API for the notification system
//!
//! External modules should import from here rather than directly from internal modules.

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::event::{EventFilter, QueueEvent, QueueEventType};
pub use crate::notifications::manager::{EventReceiver, NotificationManager, SubscriberStatistics};
