// crates/folio-cli/tests/reference_commands.rs
// ============================================================================
// Module: CLI Reference Command Tests
// Description: Integration tests for `folio reference check`.
// Purpose: Ensure single-reference checks separate usage errors from misses.
// Dependencies: folio-cli binary
// ============================================================================

//! ## Overview
//! Runs `folio reference check` with an allow-list config and verifies exit
//! codes for found, missing, absent, and non-integer values.

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
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde_json::Value;

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

fn write_allow_list_config(root: &Path) -> PathBuf {
    let config = root.join("folio.toml");
    fs::write(&config, "[lookup]\nmode = \"allow_list\"\n\n[lookup.allow_list]\nyyy = [5]\n")
        .expect("write config");
    config
}

fn check(config: &Path, set: &str, value: &str) -> Output {
    Command::new(folio_bin())
        .args(["reference", "check", "--set", set, "--value", value, "--config"])
        .arg(config)
        .output()
        .expect("run folio reference check")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn known_and_unknown_ids_map_to_exit_codes() {
    let root = temp_root("reference-known");
    let config = write_allow_list_config(&root);

    let output = check(&config, "yyy", "5");
    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["set"], "Yyy");
    assert_eq!(report["valid"], true);
    assert_eq!(report["lookup"], "allow_list");

    let output = check(&config, "yyy", "6");
    assert_eq!(output.status.code(), Some(1));

    cleanup(&root);
}

#[test]
fn null_and_empty_values_pass() {
    let root = temp_root("reference-null");
    let config = write_allow_list_config(&root);

    assert_eq!(check(&config, "yyy", "null").status.code(), Some(0));
    assert_eq!(check(&config, "yyy", "\"\"").status.code(), Some(0));

    cleanup(&root);
}

#[test]
fn set_without_list_is_unchecked() {
    let root = temp_root("reference-unchecked");
    let config = write_allow_list_config(&root);

    assert_eq!(check(&config, "zzz", "999").status.code(), Some(0));

    cleanup(&root);
}

#[test]
fn non_integer_value_is_a_usage_error() {
    let root = temp_root("reference-usage");
    let config = write_allow_list_config(&root);

    let output = check(&config, "zzz", "\"42\"");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must be an integer"));

    let output = check(&config, "zzz", "not-json");
    assert_eq!(output.status.code(), Some(2));

    cleanup(&root);
}
