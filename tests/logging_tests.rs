use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

use test_helpers::command_with_data;

/// Failures are logged exactly once, at the application boundary.
#[test]
fn test_single_error_log_for_failed_command() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    let data = home.path().join("missing.json");

    let output = command_with_data(home.path(), &data)
        .args(["--log-format", "json", "mood", "list"])
        .output()?;
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr)?;
    let error_events: Vec<Value> = stderr
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|event| event["level"] == "ERROR")
        .collect();

    assert_eq!(error_events.len(), 1, "stderr was: {}", stderr);
    assert_eq!(error_events[0]["fields"]["message"], "Command failed");
    assert!(error_events[0]["span"]["correlation_id"].is_string());

    // The human-readable message is printed as well.
    assert!(stderr.contains("Error: Data file not found"));
    Ok(())
}

#[test]
fn test_default_level_is_quiet() {
    let home = tempdir().unwrap();
    let data = home.path().join("data.json");

    command_with_data(home.path(), &data)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_rust_log_overrides_default() {
    let home = tempdir().unwrap();
    let data = home.path().join("data.json");

    command_with_data(home.path(), &data)
        .env("RUST_LOG", "info")
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("Initialized data file"));
}
