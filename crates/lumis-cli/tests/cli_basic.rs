//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They
//! run against the dev data directory so a developer's real state is
//! never touched.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "lumis-cli", "--"])
        .args(args)
        .env("LUMIS_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_track_status() {
    let (stdout, _stderr, code) = run_cli(&["track", "status"]);
    assert_eq!(code, 0, "track status failed");
    assert!(stdout.contains("light_minutes"));
    assert!(stdout.contains("current_streak"));
}

#[test]
fn test_goal_show() {
    let (stdout, _stderr, code) = run_cli(&["goal", "show"]);
    assert_eq!(code, 0, "goal show failed");
    assert!(stdout.contains("daily_goal_minutes"));
}

#[test]
fn test_apps_add_and_list() {
    let (_stdout, _stderr, code) = run_cli(&["apps", "add", "--id", "test.app", "--name", "Test App"]);
    assert_eq!(code, 0, "apps add failed");

    let (stdout, _stderr, code) = run_cli(&["apps", "list", "--json"]);
    assert_eq!(code, 0, "apps list failed");
    assert!(stdout.contains("test.app"));
}

#[test]
fn test_shield_status() {
    let (stdout, _stderr, code) = run_cli(&["shield", "status"]);
    assert_eq!(code, 0, "shield status failed");
    assert!(stdout.contains("engage"));
}

#[test]
fn test_passes_show() {
    let (stdout, _stderr, code) = run_cli(&["passes", "show"]);
    assert_eq!(code, 0, "passes show failed");
    assert!(stdout.contains("skip_passes"));
}

#[test]
fn test_config_get() {
    let (stdout, _stderr, code) = run_cli(&["config", "get", "goal.daily_goal_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_calibrate_rejects_inverted_baselines() {
    let (_stdout, stderr, code) =
        run_cli(&["calibrate", "set", "--indoor", "5000", "--outdoor", "100"]);
    assert_ne!(code, 0, "inverted calibration should fail");
    assert!(stderr.contains("error"));
}
