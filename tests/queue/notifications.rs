//! Event subscribers and exception callbacks through the public API

use pcqueue::queue::api::{
    EventFilter, ExceptionKind, ProducerConsumerQueue, QueueError, QueueEventType,
    QueueException,
};
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("item {0} is odd")]
struct OddItem(u32);

#[tokio::test]
async fn test_lifecycle_events_in_order() {
    let queue = ProducerConsumerQueue::builder()
        .name("events")
        .handler(|_: u32| Ok(()))
        .build()
        .unwrap();
    let mut events = queue.subscribe("observer", EventFilter::LifecycleOnly);

    for n in 0..3 {
        queue.add(n).unwrap();
    }
    queue.complete_adding().unwrap();

    let adding_completed = events.recv().await.unwrap();
    assert_eq!(adding_completed.event_type, QueueEventType::AddingCompleted);
    assert_eq!(adding_completed.queue_id, "events");

    let completed = events.recv().await.unwrap();
    assert_eq!(completed.event_type, QueueEventType::Completed);
    assert!(queue.completion().await);

    queue.dispose();
    let disposed = events.recv().await.unwrap();
    assert_eq!(disposed.event_type, QueueEventType::Disposed);
    assert_eq!(disposed.size, Some(0));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_failures_reach_callbacks_and_subscribers() {
    let callbacks = Arc::new(Mutex::new(Vec::<QueueException>::new()));
    let sink = Arc::clone(&callbacks);

    let queue = ProducerConsumerQueue::builder()
        .max_concurrency_level(2)
        .handler(|n: u32| {
            if n % 2 == 1 {
                Err(OddItem(n).into())
            } else {
                Ok(())
            }
        })
        .on_exception(move |ex| sink.lock().unwrap().push(ex.clone()))
        .build()
        .unwrap();
    let mut exceptions = queue.subscribe("errors", EventFilter::ExceptionsOnly);

    for n in 0..10 {
        queue.add(n).unwrap();
    }
    queue.complete_adding().unwrap();
    assert!(queue.completion().await);

    let mut odd = Vec::new();
    while let Ok(event) = exceptions.try_recv() {
        assert_eq!(event.event_type, QueueEventType::ItemFailed);
        let ex = event.exception.expect("exception events carry the exception");
        odd.push(ex.inner_as::<OddItem>().map(|e| e.0).unwrap());
    }
    odd.sort_unstable();
    assert_eq!(odd, vec![1, 3, 5, 7, 9]);

    let callbacks = callbacks.lock().unwrap();
    assert_eq!(callbacks.len(), 5);
    assert!(callbacks
        .iter()
        .all(|ex| ex.kind() == ExceptionKind::Handler && ex.source().is_some()));
    assert_eq!(queue.stats().failed, 5);
}

#[test]
fn test_add_failure_after_completion() {
    let raised = Arc::new(Mutex::new(Vec::<QueueException>::new()));
    let sink = Arc::clone(&raised);
    let queue = ProducerConsumerQueue::new(|_: u32| Ok(()), 1, None).unwrap();
    queue.on_exception(move |ex: &QueueException| sink.lock().unwrap().push(ex.clone()));

    queue.complete_adding().unwrap();
    queue.add(1).unwrap();

    let raised = raised.lock().unwrap();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].message(), "Exception occurred when adding item.");
    assert_eq!(
        raised[0].inner_as::<QueueError>(),
        Some(&QueueError::AddingCompleted)
    );
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let queue = ProducerConsumerQueue::new(|_: u32| Ok(()), 1, None).unwrap();
    let mut receiver = queue.subscribe("temporary", EventFilter::All);

    assert!(queue.unsubscribe("temporary"));
    assert!(!queue.unsubscribe("temporary"));

    queue.complete_adding().unwrap();
    assert_eq!(
        queue.completion().wait_timeout(Duration::from_secs(1)),
        Some(true)
    );
    assert!(receiver.try_recv().is_err());
}
