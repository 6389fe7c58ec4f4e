//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run the CLI with `args` and return (exit code, stdout, stderr).
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_audiobait"))
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("audiobait.toml");
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_version() {
    let (code, stdout, _) = run_cli(&["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_window_prints_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[window]\nstart = \"06:30\"\nend = \"19:45\"\n");

    let (code, stdout, stderr) = run_cli(&["window", "-c", &config]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("window: 06:30 to 19:45"));
    assert!(stdout.contains("status: "));
}

#[test]
fn test_window_always_open_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let (code, stdout, _) = run_cli(&["-c", &config, "window"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("status: open"));
}

#[test]
fn test_missing_config_fails() {
    let (code, _, stderr) = run_cli(&["window", "-c", "/nonexistent/audiobait.toml"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Failed to load configuration"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[play]\nfile = \"loudest\"\n");

    let (code, _, stderr) = run_cli(&["window", "-c", &config]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid sound choice"));
}

#[test]
fn test_sync_requires_api_section() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let (code, _, stderr) = run_cli(&["sync", "-c", &config]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no [api] section"));
}
