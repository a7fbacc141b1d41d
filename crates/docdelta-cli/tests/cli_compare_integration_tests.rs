//! CLI compare integration tests
//!
//! These tests run the `docdelta` binary against plain-text files written to
//! a temporary directory.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write(temp_dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn docdelta(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docdelta"))
        .current_dir(temp_dir.path())
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn setup_pair(temp_dir: &TempDir) {
    write(
        temp_dir,
        "v1.txt",
        "Master Services Agreement\n\u{0C}Payment is due within 30 days.\n",
    );
    write(
        temp_dir,
        "v2.txt",
        "Master Services Agreement\n\u{0C}Payment is due within 45 days.\n",
    );
}

#[test]
fn test_cli_compare_json_output() {
    let temp_dir = TempDir::new().unwrap();
    setup_pair(&temp_dir);

    let output = docdelta(&temp_dir, &["compare", "v1.txt", "v2.txt"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pairs = json["documentComparisonResults"].as_array().unwrap();
    let changed: Vec<_> = pairs
        .iter()
        .filter(|p| p["originalPageIndex"] == 1)
        .collect();
    assert_eq!(changed.len(), 1);
    let ops = changed[0]["comparisonResults"][0]["hunks"][0]["operations"]
        .as_array()
        .unwrap();
    assert!(ops
        .iter()
        .any(|op| op["type"] == "insert" && op["text"] == "45"));
}

#[test]
fn test_cli_identical_documents_print_null() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir, "a.txt", "Same text\n");
    write(&temp_dir, "b.txt", "Same text\n");

    let output = docdelta(&temp_dir, &["compare", "a.txt", "b.txt"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn test_cli_summary_format() {
    let temp_dir = TempDir::new().unwrap();
    setup_pair(&temp_dir);

    let output = docdelta(
        &temp_dir,
        &["compare", "v1.txt", "v2.txt", "--format", "summary"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Document Comparison"));
    assert!(stdout.contains("### Page 2"));
    assert!(stdout.contains("- `+` \"45\""));
}

#[test]
fn test_cli_settings_file_and_flag_override() {
    let temp_dir = TempDir::new().unwrap();
    setup_pair(&temp_dir);
    write(&temp_dir, "docdelta.toml", "format = \"summary\"\n");

    let from_file = docdelta(
        &temp_dir,
        &["--config", "docdelta.toml", "compare", "v1.txt", "v2.txt"],
    );
    assert!(from_file.status.success());
    assert!(String::from_utf8_lossy(&from_file.stdout).contains("## Document Comparison"));

    let overridden = docdelta(
        &temp_dir,
        &[
            "--config",
            "docdelta.toml",
            "compare",
            "v1.txt",
            "v2.txt",
            "--format",
            "json",
        ],
    );
    assert!(overridden.status.success());
    let json: serde_json::Value = serde_json::from_slice(&overridden.stdout).unwrap();
    assert!(json["documentComparisonResults"].is_array());
}

#[test]
fn test_cli_page_selection() {
    let temp_dir = TempDir::new().unwrap();
    setup_pair(&temp_dir);

    // Only the unchanged first page of each side.
    let output = docdelta(
        &temp_dir,
        &[
            "compare",
            "v1.txt",
            "v2.txt",
            "--original-pages",
            "0",
            "--changed-pages",
            "0",
        ],
    );

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn test_cli_writes_output_file() {
    let temp_dir = TempDir::new().unwrap();
    setup_pair(&temp_dir);

    let output = docdelta(
        &temp_dir,
        &["compare", "v1.txt", "v2.txt", "--output", "diff.json"],
    );

    assert!(output.status.success());
    let written = fs::read_to_string(temp_dir.path().join("diff.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert!(json["documentComparisonResults"].is_array());
}

#[test]
fn test_cli_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir, "v1.txt", "text\n");

    let output = docdelta(&temp_dir, &["compare", "v1.txt", "absent.txt"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_DOCUMENT_UNAVAILABLE"), "stderr: {}", stderr);
    assert!(stderr.contains("changed"));
}

#[test]
fn test_cli_out_of_range_page_fails() {
    let temp_dir = TempDir::new().unwrap();
    setup_pair(&temp_dir);

    let output = docdelta(
        &temp_dir,
        &["compare", "v1.txt", "v2.txt", "--original-pages", "0-9"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_PAGE_SELECTION"));
}
