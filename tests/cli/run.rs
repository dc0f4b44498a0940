//! End-to-end runs of the `pcqueue` binary

use crate::common::write_config;
use std::process::{Command, Output};

fn run_pcqueue(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pcqueue"))
        .args(args)
        .output()
        .expect("failed to run pcqueue binary")
}

#[test]
fn test_run_drains_and_reports_failures() {
    let config = write_config("log-level = \"warn\"\n");
    let config_path = config.path().to_string_lossy().into_owned();

    let output = run_pcqueue(&[
        "--config-file",
        &config_path,
        "--name",
        "e2e",
        "--workers",
        "3",
        "--capacity",
        "4",
        "--items",
        "40",
        "--producers",
        "2",
        "--work-ms",
        "0",
        "--fail-every",
        "10",
        "--no-color",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout);
    assert!(stdout.contains("Queue 'e2e' drained"));
    assert!(stdout.lines().any(|l| l.trim() == "enqueued   40"));
    assert!(stdout.lines().any(|l| l.trim() == "failed     4"));
}

#[test]
fn test_queue_settings_from_config_file() {
    let config = write_config(
        r#"
        items = 5
        work-ms = 0
        log-level = "off"

        [queue]
        name = "configured"
        max_concurrency_level = 2
        "#,
    );
    let config_path = config.path().to_string_lossy().into_owned();

    let output = run_pcqueue(&["--config-file", &config_path, "--no-color"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Queue 'configured' drained"));
    assert!(stdout.lines().any(|l| l.trim() == "processed  5"));
}

#[test]
fn test_missing_config_file_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let missing = missing.to_string_lossy().into_owned();

    let output = run_pcqueue(&["--config-file", &missing]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_invalid_capacity_exits_with_error() {
    let config = write_config("log-level = \"off\"\n");
    let config_path = config.path().to_string_lossy().into_owned();

    let output = run_pcqueue(&["--config-file", &config_path, "--capacity", "0"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bounded_capacity"));
}
