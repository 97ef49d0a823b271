//! Policy discovery against a real directory tree

use std::fs;
use std::path::Path;

use lintel_config::{filter_ignored_paths, Config, ConfigError, CONFIG_FILE_NAME};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "main.rego", "package main\n");
    write(root, "lib/util.rego", "package lib.util\n");
    write(root, "lib/util_test.rego", "package lib.util_test\n");
    write(root, "vendor/dep/dep.rego", "package dep\n");
    write(root, ".git/hooks/hook.rego", "package hook\n");
    write(root, "node_modules/x/x.rego", "package x\n");
    write(root, "README.md", "# docs\n");

    dir
}

fn relative(root: &Path, paths: Vec<String>) -> Vec<String> {
    let prefix = format!("{}/", root.display());
    paths
        .into_iter()
        .map(|p| p.strip_prefix(&prefix).unwrap_or(&p).to_string())
        .collect()
}

#[test]
fn test_walk_finds_policy_files_only() {
    let dir = project();
    let root = dir.path().display().to_string();

    let files = filter_ignored_paths(&[root.clone()], &[], true, &root).unwrap();

    assert_eq!(
        relative(dir.path(), files),
        vec![
            "lib/util.rego",
            "lib/util_test.rego",
            "main.rego",
            "vendor/dep/dep.rego",
        ]
    );
}

#[test]
fn test_walk_applies_ignore_patterns() {
    let dir = project();
    let root = dir.path().display().to_string();
    let ignore = vec!["vendor/".to_string(), "*_test.rego".to_string()];

    let files = filter_ignored_paths(&[root.clone()], &ignore, true, &root).unwrap();

    assert_eq!(relative(dir.path(), files), vec!["lib/util.rego", "main.rego"]);
}

#[test]
fn test_anchored_pattern_is_relative_to_root() {
    let dir = project();
    let root = dir.path().display().to_string();
    let ignore = vec!["/lib/util.rego".to_string()];

    let files = filter_ignored_paths(&[root.clone()], &ignore, true, &root).unwrap();

    assert_eq!(
        relative(dir.path(), files),
        vec!["lib/util_test.rego", "main.rego", "vendor/dep/dep.rego"]
    );
}

#[test]
fn test_single_file_input() {
    let dir = project();
    let file = dir.path().join("main.rego").display().to_string();

    let files = filter_ignored_paths(&[file.clone()], &[], true, "").unwrap();
    assert_eq!(files, vec![file]);
}

#[test]
fn test_missing_paths_are_all_reported() {
    let dir = project();
    let missing_a = dir.path().join("missing-a").display().to_string();
    let missing_b = dir.path().join("missing-b").display().to_string();
    let existing = dir.path().display().to_string();

    let err = filter_ignored_paths(&[missing_a.clone(), existing, missing_b.clone()], &[], true, "")
        .unwrap_err();

    let ConfigError::Walk(errors) = &err else {
        panic!("expected walk error, got {err}");
    };
    assert_eq!(errors.len(), 2);

    let message = err.to_string();
    assert!(message.starts_with("failed to filter paths:\n"));
    assert!(message.contains(&missing_a));
    assert!(message.contains(&missing_b));
}

#[test]
fn test_find_config_in_ancestor() {
    let dir = project();
    write(dir.path(), CONFIG_FILE_NAME, "[ignore]\nfiles = [\"vendor/\"]\n");

    let nested = dir.path().join("lib");
    let found = Config::find(&nested).unwrap();
    assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));

    let config = Config::load(&found).unwrap();
    assert_eq!(config.ignore.files, vec!["vendor/"]);
}
