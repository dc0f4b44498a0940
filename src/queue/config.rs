//! Queue configuration
//!
//! `QueueConfig` can be deserialised from TOML. A negative or absent
//! `bounded_capacity` means unbounded.
//!
//! ```toml
//! name = "ingest"
//! max_concurrency_level = 4
//! bounded_capacity = 256
//! ```

use crate::core::validation::{validate_capacity, validate_queue_name, ValidationError};
use serde::Deserialize;

pub const DEFAULT_QUEUE_NAME: &str = "queue";
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    pub name: String,
    pub max_concurrency_level: usize,
    pub bounded_capacity: i64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_QUEUE_NAME.to_string(),
            max_concurrency_level: 1,
            bounded_capacity: UNBOUNDED,
        }
    }
}

impl QueueConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ValidationError> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| ValidationError::new(format!("Invalid queue configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_queue_name(&self.name)?;
        if self.max_concurrency_level == 0 {
            return Err(ValidationError::new(
                "max_concurrency_level must be greater than 0",
            ));
        }
        validate_capacity(self.bounded_capacity)?;
        Ok(())
    }

    /// Capacity as used by the queue: `None` for unbounded
    pub fn capacity(&self) -> Result<Option<usize>, ValidationError> {
        validate_capacity(self.bounded_capacity)
    }
}
