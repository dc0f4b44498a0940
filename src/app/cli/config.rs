//! TOML configuration file parsing and loading
//!
//! Handles loading of the optional configuration file, including default
//! config file discovery. Values from the file only fill options that were
//! not given on the command line.
//!
//! ```toml
//! items = 500
//! producers = 2
//! work-ms = 5
//! fail-every = 50
//! log-level = "debug"
//!
//! [queue]
//! name = "demo"
//! max_concurrency_level = 4
//! bounded_capacity = 32
//! ```

use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;
use crate::queue::api::QueueConfig;
use std::path::{Path, PathBuf};

use super::args::Args;

pub const CONFIG_DIR_NAME: &str = "Pcqueue";
pub const CONFIG_FILE_NAME: &str = "pcqueue.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {path}")]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Error in configuration file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { source, .. } => Some(source.message()),
            _ => None,
        }
    }
}

/// `<config dir>/Pcqueue/pcqueue.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Args {
    /// Load the config file and apply its values to unset options
    ///
    /// An explicit path must exist; the default path is used only when present.
    /// Returns the path that was loaded, if any.
    pub async fn parse_config_file(
        args: &mut Self,
        config_file: Option<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                path
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let contents = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
        Self::apply_config_str(args, &contents, &config_path)?;

        Ok(Some(config_path))
    }

    pub(crate) fn apply_config_str(
        args: &mut Self,
        contents: &str,
        path: &Path,
    ) -> Result<(), ConfigError> {
        let config = toml::from_str::<toml::Table>(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::apply_toml_values(args, &config).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply TOML configuration values to options the command line left unset
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ValidationError> {
        if let Some(value) = config.get("queue") {
            let queue: QueueConfig = value
                .clone()
                .try_into()
                .map_err(|e| ValidationError::new(format!("Invalid [queue] section: {}", e)))?;
            queue.validate()?;

            if let Some(table) = value.as_table() {
                if table.contains_key("name") {
                    args.name.get_or_insert(queue.name);
                }
                if table.contains_key("max_concurrency_level") {
                    args.workers.get_or_insert(queue.max_concurrency_level);
                }
                if table.contains_key("bounded_capacity") {
                    args.capacity.get_or_insert(queue.bounded_capacity);
                }
            }
        }

        if let Some(items) = Self::non_negative(config, "items")? {
            args.items.get_or_insert(items);
        }
        if let Some(producers) = Self::non_negative(config, "producers")? {
            if producers == 0 {
                return Err(ValidationError::new("producers must be greater than 0"));
            }
            args.producers.get_or_insert(producers);
        }
        if let Some(work_ms) = Self::non_negative(config, "work-ms")? {
            args.work_ms.get_or_insert(work_ms as u64);
        }
        if let Some(fail_every) = Self::non_negative(config, "fail-every")? {
            args.fail_every.get_or_insert(fail_every);
        }

        if !args.color && !args.no_color {
            if let Some(color) = config.get("color").and_then(|v| v.as_bool()) {
                args.color = color;
                args.no_color = !color;
            }
        }
        if let Some(log_level) = config.get("log-level").and_then(|v| v.as_str()) {
            args.log_level.get_or_insert_with(|| log_level.to_string());
        }
        if let Some(log_format) = config.get("log-format").and_then(|v| v.as_str()) {
            args.log_format.get_or_insert_with(|| log_format.to_string());
        }
        if args.log_file.is_none() {
            if let Some(log_file) = config.get("log-file").and_then(|v| v.as_str()) {
                // "none" and "-" keep file logging disabled
                if !log_file.eq_ignore_ascii_case("none") && log_file != "-" {
                    args.log_file = Some(PathBuf::from(log_file));
                }
            }
        }

        Ok(())
    }

    fn non_negative(config: &toml::Table, key: &str) -> Result<Option<usize>, ValidationError> {
        match config.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_integer()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    ValidationError::new(format!("'{}' must be a non-negative integer", key))
                }),
        }
    }
}
