//! Core infrastructure shared by the queue, notifications and the CLI

pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod sync;
pub mod validation;
