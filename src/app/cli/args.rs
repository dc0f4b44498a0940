//! Core CLI arguments structure and basic functionality
//!
//! Every option is optional so that values from the configuration file can
//! fill whatever the command line leaves unset.

use crate::core::validation::{validate_positive_int, ValidationError};
use crate::queue::api::{QueueConfig, DEFAULT_QUEUE_NAME, UNBOUNDED};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ITEMS: usize = 100;
pub const DEFAULT_PRODUCERS: usize = 1;
pub const DEFAULT_WORK_MS: u64 = 10;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "pcqueue")]
#[command(about = "Drive a synthetic workload through a bounded producer-consumer queue")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Queue name, also used for worker thread names
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Number of consumer workers
    #[arg(short = 'w', long = "workers", value_name = "COUNT", value_parser = validate_positive_int)]
    pub workers: Option<usize>,

    /// Maximum buffered items (-1 for unbounded)
    #[arg(
        short = 'b',
        long = "capacity",
        value_name = "ITEMS",
        allow_negative_numbers = true
    )]
    pub capacity: Option<i64>,

    /// Number of items to produce
    #[arg(short = 'i', long = "items", value_name = "COUNT")]
    pub items: Option<usize>,

    /// Number of producer threads
    #[arg(short = 'p', long = "producers", value_name = "COUNT", value_parser = validate_positive_int)]
    pub producers: Option<usize>,

    /// Simulated work per item in milliseconds
    #[arg(long = "work-ms", value_name = "MS")]
    pub work_ms: Option<u64>,

    /// Fail every Nth item (0 disables failures)
    #[arg(long = "fail-every", value_name = "N")]
    pub fail_every: Option<usize>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour is on when forced, off when disabled, otherwise follows the terminal
    pub fn use_color(&self) -> bool {
        if self.no_color {
            false
        } else {
            self.color || std::io::stdout().is_terminal()
        }
    }

    /// Queue configuration resolved from the arguments and their defaults
    pub fn queue_config(&self) -> Result<QueueConfig, ValidationError> {
        let config = QueueConfig {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string()),
            max_concurrency_level: self.workers.unwrap_or(1),
            bounded_capacity: self.capacity.unwrap_or(UNBOUNDED),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn item_count(&self) -> usize {
        self.items.unwrap_or(DEFAULT_ITEMS)
    }

    pub fn producer_count(&self) -> usize {
        self.producers.unwrap_or(DEFAULT_PRODUCERS)
    }

    pub fn work_duration(&self) -> Duration {
        Duration::from_millis(self.work_ms.unwrap_or(DEFAULT_WORK_MS))
    }

    /// `None` when failures are disabled
    pub fn fail_every(&self) -> Option<usize> {
        self.fail_every.filter(|n| *n > 0)
    }

    pub fn log_file_str(&self) -> Option<String> {
        self.log_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
    }
}
