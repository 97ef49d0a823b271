//! End-to-end tests for the `lintel` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const POLICY: &str = "package example\n\nallow if input.admin\n";

fn lintel(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lintel"))
        .args(args)
        .current_dir(dir)
        .env_remove("LINTEL_LOG")
        .output()
        .expect("failed to run lintel")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_parse_requires_a_path() {
    let dir = TempDir::new().unwrap();
    let output = lintel(&["parse"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("no file to parse provided"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_parse_rejects_multiple_paths() {
    let dir = TempDir::new().unwrap();
    // neither file exists; the usage error must come first
    let output = lintel(&["parse", "a.rego", "b.rego"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("only one file can be parsed at a time"));
}

#[test]
fn test_parse_prints_pretty_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("policy.rego"), POLICY).unwrap();

    let output = lintel(&["parse", "policy.rego"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.starts_with("{\n  \"package\": {\n"));
    assert!(text.ends_with("}\n"));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["package"]["location"], "1:1:1:8");
    assert_eq!(json["package"]["path"][1]["value"], "example");
    assert_eq!(json["rules"][0]["head"]["ref"][0]["value"], "allow");
}

#[test]
fn test_parse_compact() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("policy.rego"), POLICY).unwrap();

    let output = lintel(&["parse", "--compact", "policy.rego"], dir.path());
    assert!(output.status.success());

    let text = stdout(&output);
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("{\"package\":{\"location\":\"1:1:1:8\""));
}

#[test]
fn test_parse_error_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.rego"), "package p\n\nallow if {\n").unwrap();

    let output = lintel(&["parse", "broken.rego"], dir.path());

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("unexpected end of file"));
}

#[test]
fn test_parse_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = lintel(&["parse", "missing.rego"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to read missing.rego"));
}

#[test]
fn test_files_uses_config_and_flags() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("vendor")).unwrap();
    fs::create_dir_all(root.join("policy")).unwrap();
    fs::write(root.join("policy/a.rego"), POLICY).unwrap();
    fs::write(root.join("policy/a_test.rego"), POLICY).unwrap();
    fs::write(root.join("vendor/v.rego"), POLICY).unwrap();
    fs::write(root.join(".lintel.toml"), "[ignore]\nfiles = [\"vendor/\"]\n").unwrap();

    let output = lintel(&["files", ".", "--ignore", "*_test.rego"], root);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let files: Vec<_> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(files, vec!["./policy/a.rego"]);
}

#[test]
fn test_files_reports_missing_paths() {
    let dir = TempDir::new().unwrap();
    let output = lintel(&["files", "nope-1", "nope-2"], dir.path());

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("nope-1"));
    assert!(err.contains("nope-2"));
}
