//! Queue Integration Test Modules

pub mod notifications;
pub mod pipeline;
