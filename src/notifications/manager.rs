//! NotificationManager implementation

use crate::notifications::error::NotificationError;
use crate::notifications::event::{EventFilter, QueueEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Instant;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type EventReceiver = UnboundedReceiver<QueueEvent>;

/// Statistics tracking for a subscriber
#[derive(Debug, Default)]
pub struct SubscriberStatistics {
    delivered: AtomicUsize,
    error_count: AtomicUsize,
    last_delivery_time: RwLock<Option<Instant>>,
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_delivery_time.write() {
            *time = Some(Instant::now());
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_delivery_time(&self) -> Option<Instant> {
        *self.last_delivery_time.read().ok()?
    }
}

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<QueueEvent>,
    statistics: Arc<SubscriberStatistics>,
}

/// Fans queue events out to subscribed channels
#[derive(Default)]
pub struct NotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return the receiving end of its channel
    ///
    /// Subscribing again with the same id replaces the earlier channel.
    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> EventReceiver {
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: Arc::new(SubscriberStatistics::new()),
        };

        if let Some(existing) = self.subscribers.insert(subscriber_id.clone(), subscriber_info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        receiver
    }

    pub fn unsubscribe(&mut self, subscriber_id: &str) -> bool {
        self.subscribers.remove(subscriber_id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.contains_key(subscriber_id)
    }

    pub fn subscriber_statistics(&self, subscriber_id: &str) -> Option<Arc<SubscriberStatistics>> {
        self.subscribers
            .get(subscriber_id)
            .map(|info| Arc::clone(&info.statistics))
    }

    /// Deliver an event to every subscriber whose filter accepts it
    ///
    /// Subscribers whose receiver was dropped are removed and reported in
    /// the returned error; delivery to the others still happens.
    pub fn publish(&mut self, event: QueueEvent) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if !subscriber_info.filter.accepts(&event) {
                continue;
            }

            match subscriber_info.sender.send(event.clone()) {
                Ok(()) => subscriber_info.statistics.record_delivered(),
                Err(_) => {
                    subscriber_info.statistics.record_error();
                    failed_subscribers.push(subscriber_id.clone());
                }
            }
        }

        for subscriber_id in &failed_subscribers {
            self.subscribers.remove(subscriber_id);
            log::debug!("Removed subscriber '{}' with closed channel", subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type: event.event_type.as_str().to_string(),
                failed_subscribers,
            });
        }

        Ok(())
    }
}
