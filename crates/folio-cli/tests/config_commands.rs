// crates/folio-cli/tests/config_commands.rs
// ============================================================================
// Module: CLI Config Command Tests
// Description: Integration tests for `folio config check`.
// Purpose: Ensure config checks report success and fail closed on errors.
// Dependencies: folio-cli binary
// ============================================================================

//! ## Overview
//! Runs the CLI binary for config checks and ensures invalid configuration
//! fails closed with explicit errors.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn folio_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_folio"))
}

fn temp_root(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("folio-cli-{label}-{nanos}"));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_dir_all(path);
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn config_check_accepts_valid_config() {
    let root = temp_root("config-check-ok");
    let config_path = root.join("folio.toml");
    fs::write(&config_path, "[lookup]\nmode = \"allow_list\"\n\n[lookup.allow_list]\nzzz = [1]\n")
        .expect("write config");

    let output = Command::new(folio_bin())
        .args(["config", "check", "--config"])
        .arg(&config_path)
        .output()
        .expect("config check");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lookup=allow_list"));
    assert!(stdout.contains("audit=off"));

    cleanup(&root);
}

#[test]
fn config_check_without_file_uses_defaults() {
    let root = temp_root("config-check-defaults");

    let output = Command::new(folio_bin())
        .current_dir(&root)
        .env_remove("FOLIO_CONFIG")
        .args(["config", "check"])
        .output()
        .expect("config check");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lookup=none"));
    assert!(stdout.contains("source=defaults"));

    cleanup(&root);
}

#[test]
fn config_check_honors_environment_override() {
    let root = temp_root("config-check-env");
    let config_path = root.join("custom.toml");
    fs::write(&config_path, "[audit]\nmode = \"stderr\"\n").expect("write config");

    let output = Command::new(folio_bin())
        .current_dir(&root)
        .env("FOLIO_CONFIG", &config_path)
        .args(["config", "check"])
        .output()
        .expect("config check");

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("audit=stderr"));

    cleanup(&root);
}

#[test]
fn config_check_rejects_inconsistent_lookup() {
    let root = temp_root("config-check-invalid");
    let config_path = root.join("folio.toml");
    fs::write(&config_path, "[lookup]\nmode = \"sqlite\"\n").expect("write config");

    let output = Command::new(folio_bin())
        .args(["config", "check", "--config"])
        .arg(&config_path)
        .output()
        .expect("config check");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lookup.mode sqlite requires lookup.sqlite"));

    cleanup(&root);
}
