//! Queue event notifications
//!
//! Each queue owns a [`NotificationManager`](api::NotificationManager) that
//! fans lifecycle and exception events out to subscribers over unbounded
//! channels. Subscribers pick what they receive with an
//! [`EventFilter`](api::EventFilter).

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod manager;

pub mod api;
