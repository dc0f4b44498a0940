//! Bounded Producer-Consumer Queue
//!
//! A queue that accepts work items from any number of producer threads,
//! buffers them (optionally bounded), and dispatches them to a fixed pool of
//! worker threads running a user-supplied handler.
//!
//! # Overview
//!
//! - **Backpressure**: `add` blocks while a bounded queue is full;
//!   `try_add`/`try_add_timeout` give up instead
//! - **Exactly-once delivery**: each item goes to one worker; with one
//!   worker, handling order equals enqueue order
//! - **Contained failures**: handler errors and panics are caught per item
//!   and reported through the exception event, never to the producer
//! - **Completion**: a signal resolving `true` once adding is complete and
//!   the buffer drained, or `false` if the queue was disposed first
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  ┌────────────┐  ┌────────────┐
//! │ Producer A │  │ Producer B │  │ Producer C │
//! └─────┬──────┘  └─────┬──────┘  └─────┬──────┘
//!       │ add / try_add │               │
//!       ▼               ▼               ▼
//! ┌─────────────────────────────────────────────┐
//! │  bounded buffer (Mutex + not_full/not_empty)│
//! │   ┌───┬───┬───┬───┬───┐                     │
//! │   │ 1 │ 2 │ 3 │ 4 │...│  FIFO               │
//! │   └───┴───┴───┴───┴───┘                     │
//! └───────┬───────────────┬───────────────┬─────┘
//!         │ take          │ take          │ take
//!   ┌─────┴────┐    ┌─────┴────┐    ┌─────┴────┐
//!   │ worker 0 │    │ worker 1 │    │ worker N │──► handler(item)
//!   └──────────┘    └──────────┘    └──────────┘
//!         │ errors / panics
//!         ▼
//!   exception callbacks + event subscribers
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pcqueue::queue::api::ProducerConsumerQueue;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = ProducerConsumerQueue::new(
//!     |line: String| {
//!         if line.is_empty() {
//!             return Err("empty line".into());
//!         }
//!         println!("{line}");
//!         Ok(())
//!     },
//!     2,        // workers
//!     Some(32), // bounded capacity
//! )?;
//!
//! queue.on_exception(|ex| eprintln!("{} caused by {}", ex, ex.inner()));
//!
//! for line in ["a", "", "b"] {
//!     queue.add(line.to_string())?;
//! }
//! queue.complete_adding()?;
//!
//! assert!(queue.completion().wait_blocking());
//! # Ok(())
//! # }
//! ```

mod completion;
mod config;
mod consumer;
mod error;
mod exception;
mod internal;
mod producer_consumer;
mod publisher;
mod types;

pub mod api;

#[cfg(test)]
mod tests;
