//! CLI TOML configuration tests
//!
//! Tests for TOML configuration values and CLI overrides.

use clap::Parser;
use pcqueue::app::cli::args::*;
use toml::Table;

#[test]
fn test_apply_toml_values_sets_unset_options() {
    let mut args = Args::default();

    let mut config = Table::new();
    config.insert("items".to_string(), toml::Value::Integer(42));
    config.insert("work-ms".to_string(), toml::Value::Integer(0));
    config.insert(
        "log-format".to_string(),
        toml::Value::String("json".to_string()),
    );
    Args::apply_toml_values(&mut args, &config).unwrap();

    assert_eq!(args.item_count(), 42);
    assert_eq!(args.work_duration(), std::time::Duration::ZERO);
    assert_eq!(args.log_format.as_deref(), Some("json"));
}

#[test]
fn test_cli_value_wins_over_toml() {
    let mut args = Args::try_parse_from(["pcqueue", "--items", "7"]).unwrap();

    let config: Table = toml::from_str("items = 900").unwrap();
    Args::apply_toml_values(&mut args, &config).unwrap();

    assert_eq!(args.item_count(), 7);
}

#[test]
fn test_queue_section() {
    let mut args = Args::default();
    let config: Table = toml::from_str(
        r#"
        [queue]
        name = "sectioned"
        bounded_capacity = -1
        "#,
    )
    .unwrap();
    Args::apply_toml_values(&mut args, &config).unwrap();

    let queue = args.queue_config().unwrap();
    assert_eq!(queue.name, "sectioned");
    assert_eq!(queue.max_concurrency_level, 1);
    assert_eq!(queue.capacity(), Ok(None));
}

#[test]
fn test_log_file_magic_values_disable_file_logging() {
    for value in ["none", "NONE", "-"] {
        let mut args = Args::default();
        let mut config = Table::new();
        config.insert(
            "log-file".to_string(),
            toml::Value::String(value.to_string()),
        );
        Args::apply_toml_values(&mut args, &config).unwrap();
        assert_eq!(args.log_file, None, "log-file = {:?}", value);
    }
}

#[test]
fn test_invalid_queue_section_rejected() {
    let mut args = Args::default();
    let config: Table = toml::from_str("[queue]\nname = \"\"").unwrap();

    let err = Args::apply_toml_values(&mut args, &config).unwrap_err();
    assert!(err.message().contains("name"));
}
