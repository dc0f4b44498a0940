//! Public API exports for the CLI module

pub use super::args::Args;
pub use super::config::{default_config_path, ConfigError};
pub use super::display::{format_summary, RunOutcome};
