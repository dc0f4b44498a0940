//! Producers, workers, backpressure and completion through the public API

use crate::common::recording_handler;
use pcqueue::queue::api::{ProducerConsumerQueue, QueueConfig, QueueError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_fan_in_fan_out_pipeline() {
    let (handler, seen) = recording_handler::<(usize, usize)>();
    let queue = ProducerConsumerQueue::builder()
        .name("pipeline")
        .max_concurrency_level(4)
        .bounded_capacity(3)
        .handler(handler)
        .build()
        .unwrap();

    let producers: Vec<_> = (0..3)
        .map(|p| {
            let producer = queue.producer();
            thread::spawn(move || {
                for i in 0..100 {
                    producer.add((p, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in producers {
        handle.join().unwrap();
    }

    queue.complete_adding().unwrap();
    assert_eq!(
        queue.completion().wait_timeout(Duration::from_secs(10)),
        Some(true)
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 300);
    for p in 0..3 {
        let mine: Vec<usize> = seen.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
        assert_eq!(mine.len(), 100);
    }

    let stats = queue.stats();
    assert_eq!(stats.enqueued, 300);
    assert_eq!(stats.processed, 300);
    assert_eq!(stats.active_workers, 0);
}

#[test]
fn test_single_worker_order_matches_enqueue_order() {
    let (handler, seen) = recording_handler::<u32>();
    let queue = ProducerConsumerQueue::new(handler, 1, Some(2)).unwrap();

    for n in 0..50 {
        queue.add(n).unwrap();
    }
    queue.complete_adding().unwrap();
    assert!(queue.completion().wait_blocking());

    assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<_>>());
}

#[test]
fn test_try_add_rejects_when_full() {
    let gate = Arc::new(AtomicUsize::new(0));
    let handler_gate = Arc::clone(&gate);
    let queue = ProducerConsumerQueue::new(
        move |_: u32| {
            while handler_gate.load(Ordering::SeqCst) == 0 {
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        },
        1,
        Some(1),
    )
    .unwrap();

    queue.add(0).unwrap();
    // Wait for the worker to pick up item 0 so the buffer is empty
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while queue.pending_count().unwrap() != 0 && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }

    assert!(queue.try_add(1).unwrap());
    assert!(!queue.try_add_timeout(2, Duration::from_millis(20)).unwrap());

    gate.store(1, Ordering::SeqCst);
    assert!(queue.try_add_timeout(2, Duration::from_secs(2)).unwrap());

    queue.complete_adding().unwrap();
    assert!(queue.completion().wait_blocking());
    assert_eq!(queue.stats().processed, 3);
}

#[test]
fn test_dispose_abandons_pending_items() {
    let queue = ProducerConsumerQueue::new(
        |_: u32| {
            thread::sleep(Duration::from_millis(50));
            Ok(())
        },
        1,
        None,
    )
    .unwrap();

    for n in 0..20 {
        queue.add(n).unwrap();
    }
    queue.dispose();

    assert_eq!(queue.completion().result(), Some(false));
    assert_eq!(queue.pending_count(), Err(QueueError::Disposed));
    let stats = queue.stats();
    assert_eq!(stats.processed + stats.abandoned, 20);
    assert!(stats.abandoned >= 18);
}

#[test]
fn test_queue_from_toml_config() {
    let config = QueueConfig::from_toml_str(
        r#"
        name = "toml"
        max_concurrency_level = 2
        bounded_capacity = 8
        "#,
    )
    .unwrap();
    let (handler, seen) = recording_handler::<u8>();
    let queue = ProducerConsumerQueue::with_config(&config, handler).unwrap();

    assert_eq!(queue.name(), "toml");
    assert_eq!(queue.capacity(), Some(8));

    for n in 0..10 {
        queue.add(n).unwrap();
    }
    queue.complete_adding().unwrap();
    assert!(queue.completion().wait_blocking());
    assert_eq!(seen.lock().unwrap().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_producers_and_completion() {
    let (handler, seen) = recording_handler::<usize>();
    let queue = Arc::new(ProducerConsumerQueue::new(handler, 2, Some(4)).unwrap());

    let tasks: Vec<_> = (0..4)
        .map(|p| {
            let producer = queue.producer();
            tokio::task::spawn_blocking(move || {
                for i in 0..25 {
                    producer.add(p * 100 + i).unwrap();
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    queue.complete_adding().unwrap();
    let drained = tokio::time::timeout(Duration::from_secs(5), queue.completion())
        .await
        .unwrap();
    assert!(drained);
    assert_eq!(seen.lock().unwrap().len(), 100);
}
