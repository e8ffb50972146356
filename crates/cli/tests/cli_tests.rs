//! CLI integration tests

use std::process::{Command, Output};

fn coach(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_coach"))
        .args(args)
        .env_remove("COACH_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = coach(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Workout Adherence Coach"),
        "Should show app name"
    );
    let commands = [
        "profile", "users", "stats", "workout", "coach", "checkin", "exercise", "seed",
        "dataset",
    ];
    for command in commands {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = coach(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("coach"), "Should show binary name");
}

#[test]
fn test_workout_log_help() {
    let output = coach(&["workout", "log", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--difficulty"));
    assert!(stdout.contains("--condition"));
    assert!(stdout.contains("--missed"));
}

#[test]
fn test_coach_requires_condition() {
    let output = coach(&["coach", "user_001"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("--condition"));
}

#[test]
fn test_out_of_range_condition_fails_before_request() {
    // Nothing listens on this port; validation must fail first
    let output = coach(&[
        "--api-url",
        "http://127.0.0.1:9",
        "coach",
        "user_001",
        "--condition",
        "9",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("current_condition"), "stderr: {}", stderr);
}

#[test]
fn test_seed_writes_table() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    let output = coach(&[
        "--format",
        "json",
        "seed",
        "--output",
        path.to_str().unwrap(),
        "--users",
        "3",
        "--days",
        "5",
        "--end-date",
        "2024-03-31",
    ]);

    assert!(output.status.success());
    let table: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(table.as_object().unwrap().len(), 3);
    assert!(table.get("user_001").is_some());
}

#[test]
fn test_checkin_help() {
    let output = coach(&["checkin", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--date"));
    assert!(stdout.contains("quit"));
}
