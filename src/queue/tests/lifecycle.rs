//! Lifecycle Tests - completion, disposal and cancellation

#[cfg(test)]
mod tests {
    use crate::queue::api::{
        CancellationToken, EventFilter, ExceptionKind, ProducerConsumerQueue, QueueError,
        QueueEventType, QueueException,
    };
    use crate::queue::tests::wait_until;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_dispose_with_pending_items_resolves_false() {
        let (started_tx, started_rx) = mpsc::channel();
        let started_tx = Mutex::new(started_tx);
        let finished = Arc::new(AtomicBool::new(false));
        let handled = Arc::new(AtomicUsize::new(0));

        let queue = {
            let finished = Arc::clone(&finished);
            let handled = Arc::clone(&handled);
            ProducerConsumerQueue::new(
                move |n: u32| {
                    if n == 0 {
                        let _ = started_tx.lock().unwrap().send(());
                        thread::sleep(Duration::from_millis(200));
                        finished.store(true, Ordering::SeqCst);
                    }
                    handled.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                1,
                None,
            )
            .unwrap()
        };

        for n in 0..10 {
            queue.add(n).unwrap();
        }
        started_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        queue.dispose();

        // Dispose waits for the running handler
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(queue.completion().result(), Some(false));
        assert!(queue.is_disposed());

        assert_eq!(queue.pending_count(), Err(QueueError::Disposed));
        assert!(matches!(queue.pending_items(), Err(QueueError::Disposed)));
        assert_eq!(queue.add(11), Err(QueueError::Disposed));
        assert_eq!(queue.try_add(12), Err(QueueError::Disposed));
        assert_eq!(queue.complete_adding(), Err(QueueError::Disposed));

        let stats = queue.stats();
        assert_eq!(stats.abandoned, 9);
        assert_eq!(stats.processed, 1);

        // Configuration stays readable
        assert_eq!(queue.max_concurrency_level(), 1);
        assert_eq!(queue.capacity(), None);
    }

    #[test]
    fn test_dispose_is_idempotent_and_keeps_drained_result() {
        let queue = ProducerConsumerQueue::new(|_: u8| Ok(()), 2, Some(4)).unwrap();
        queue.add(1).unwrap();
        queue.complete_adding().unwrap();
        assert!(queue.completion().wait_blocking());

        queue.dispose();
        queue.dispose();

        assert_eq!(queue.completion().result(), Some(true));
        assert_eq!(queue.stats().abandoned, 0);
    }

    #[test]
    fn test_blocked_producer_released_by_complete_adding() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let queue = Arc::new(
            ProducerConsumerQueue::new(
                move |_: u32| {
                    let _ = release_rx
                        .lock()
                        .unwrap()
                        .recv_timeout(Duration::from_secs(5));
                    Ok(())
                },
                1,
                Some(1),
            )
            .unwrap(),
        );
        let mut events = queue.subscribe("lifecycle", EventFilter::All);

        queue.add(0).unwrap();
        assert!(wait_until(Duration::from_secs(2), || {
            queue.stats().active_workers == 1
        }));
        queue.add(1).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.add(2))
        };
        thread::sleep(Duration::from_millis(30));

        queue.complete_adding().unwrap();
        assert_eq!(producer.join().unwrap(), Ok(()));

        drop(release_tx);
        assert!(queue.completion().wait_blocking());

        let mut types = Vec::new();
        while let Some(event) = events.blocking_recv() {
            types.push(event.event_type);
            if event.event_type == QueueEventType::Completed {
                break;
            }
        }
        assert!(types.contains(&QueueEventType::AddingCompleted));
        assert!(types.contains(&QueueEventType::AddFailed));
        assert!(events.try_recv().is_err());
        assert_eq!(queue.stats().enqueued, 2);
    }

    #[test]
    fn test_add_with_cancellation() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let queue = Arc::new(
            ProducerConsumerQueue::new(
                move |_: u32| {
                    let _ = release_rx
                        .lock()
                        .unwrap()
                        .recv_timeout(Duration::from_secs(5));
                    Ok(())
                },
                1,
                Some(1),
            )
            .unwrap(),
        );

        let token = CancellationToken::new();
        queue.add_with_cancellation(0, &token).unwrap();
        assert!(wait_until(Duration::from_secs(2), || {
            queue.stats().active_workers == 1
        }));
        queue.add_with_cancellation(1, &token).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            let token = token.clone();
            thread::spawn(move || queue.add_with_cancellation(2, &token))
        };
        thread::sleep(Duration::from_millis(30));
        token.cancel();

        let begin = Instant::now();
        assert_eq!(producer.join().unwrap(), Err(QueueError::Cancelled));
        assert!(begin.elapsed() < Duration::from_secs(1));
        assert_eq!(queue.pending_count().unwrap(), 1);

        drop(release_tx);
        queue.complete_adding().unwrap();
        assert!(queue.completion().wait_blocking());
        assert_eq!(queue.stats().enqueued, 2);
    }

    #[test]
    fn test_drop_disposes_queue() {
        let queue = ProducerConsumerQueue::new(
            |_: u32| {
                thread::sleep(Duration::from_millis(20));
                Ok(())
            },
            1,
            None,
        )
        .unwrap();
        let completion = queue.completion();
        let producer = queue.producer();

        for n in 0..5 {
            queue.add(n).unwrap();
        }
        drop(queue);

        assert_eq!(completion.result(), Some(false));
        assert_eq!(producer.add(6), Err(QueueError::Disposed));
    }

    #[tokio::test]
    async fn test_completion_awaits_drain() {
        let queue = ProducerConsumerQueue::new(
            |_: u32| {
                std::thread::sleep(Duration::from_millis(2));
                Ok(())
            },
            2,
            None,
        )
        .unwrap();

        for n in 0..20 {
            queue.add(n).unwrap();
        }
        let completion = queue.completion();
        let waiter = tokio::spawn(async move { completion.wait().await });

        queue.complete_adding().unwrap();
        let drained = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(drained);
    }

    #[tokio::test]
    async fn test_dispose_publishes_abandoned_count() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let queue = ProducerConsumerQueue::new(
            move |_: u32| {
                let _ = release_rx
                    .lock()
                    .unwrap()
                    .recv_timeout(Duration::from_secs(5));
                Ok(())
            },
            1,
            None,
        )
        .unwrap();
        let mut events = queue.subscribe("dispose", EventFilter::LifecycleOnly);

        for n in 0..4 {
            queue.add(n).unwrap();
        }
        assert!(wait_until(Duration::from_secs(2), || {
            queue.stats().active_workers == 1
        }));

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(release_tx);
        });
        queue.dispose();
        releaser.join().unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type, QueueEventType::Disposed);
        assert_eq!(event.size, Some(3));
        assert!(!queue.completion().await);
    }

    #[test]
    fn test_dispose_releases_blocked_producer_with_add_exception() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let queue = Arc::new(
            ProducerConsumerQueue::new(
                move |_: u32| {
                    let _ = release_rx
                        .lock()
                        .unwrap()
                        .recv_timeout(Duration::from_secs(5));
                    Ok(())
                },
                1,
                Some(1),
            )
            .unwrap(),
        );
        let raised = Arc::new(Mutex::new(Vec::new()));
        {
            let raised = Arc::clone(&raised);
            queue.on_exception(move |ex: &QueueException| raised.lock().unwrap().push(ex.clone()));
        }

        queue.add(0).unwrap();
        assert!(wait_until(Duration::from_secs(2), || {
            queue.stats().active_workers == 1
        }));
        queue.add(1).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.add(2))
        };
        thread::sleep(Duration::from_millis(30));
        assert!(!producer.is_finished());

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(release_tx);
        });
        queue.dispose();
        releaser.join().unwrap();

        // Shutdown while blocked is reported, not returned
        assert_eq!(producer.join().unwrap(), Ok(()));

        let raised = raised.lock().unwrap();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind(), ExceptionKind::Add);
        assert_eq!(raised[0].inner_as::<QueueError>(), Some(&QueueError::Disposed));
        assert_eq!(queue.stats().rejected, 1);
        assert!(!queue.completion().wait_blocking());
    }
}
