//! Policy file discovery and `.gitignore`-style exclusion

use std::fs;
use std::io;
use std::path::MAIN_SEPARATOR;

use globset::GlobBuilder;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ConfigError, Result, WalkErrors};

/// Extension of policy files
pub const POLICY_EXTENSION: &str = ".rego";

/// Directories never descended into
pub const SKIPPED_DIRECTORIES: &[&str] = &[".git", ".idea", "node_modules"];

/// Drop every path matched by one of the `ignore` patterns.
///
/// With `check_file_exists`, each input path is expanded into the policy
/// files below it first; read failures are collected and returned together.
/// `root_dir`, when given, is stripped from paths before matching so that
/// anchored patterns are relative to it.
pub fn filter_ignored_paths(
    paths: &[String],
    ignore: &[String],
    check_file_exists: bool,
    root_dir: &str,
) -> Result<Vec<String>> {
    let mut root = root_dir.to_string();
    if !root.is_empty() && !root.ends_with(MAIN_SEPARATOR) {
        root.push(MAIN_SEPARATOR);
    }

    if check_file_exists {
        let files = walk_paths(paths)?;
        return filter_paths(files, ignore, &root);
    }

    if ignore.is_empty() {
        return Ok(paths.to_vec());
    }

    filter_paths(paths.to_vec(), ignore, &root)
}

/// Policy files at or below each path
fn walk_paths(paths: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut errors = WalkErrors::default();

    for path in paths {
        if let Err(e) = fs::metadata(path) {
            errors.push(path, e);
            continue;
        }

        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_directory(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let file = entry.path().to_string_lossy();
                    if !entry.file_type().is_dir() && file.ends_with(POLICY_EXTENSION) {
                        files.push(file.into_owned());
                    }
                }
                Err(e) => {
                    let failed = e
                        .path()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_else(|| path.into());
                    errors.push(failed, io::Error::from(e));
                }
            }
        }
    }

    if !errors.is_empty() {
        warn!(failures = errors.len(), "could not read some policy paths");
        return Err(ConfigError::Walk(errors));
    }

    Ok(files)
}

fn is_skipped_directory(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name))
}

fn filter_paths(paths: Vec<String>, ignore: &[String], root_dir: &str) -> Result<Vec<String>> {
    let mut filtered = Vec::with_capacity(paths.len());

    'outer: for path in paths {
        for pattern in ignore.iter().filter(|p| !p.is_empty()) {
            if exclude_file(pattern, &path, root_dir)? {
                debug!(path = %path, pattern = %pattern, "ignoring path");
                continue 'outer;
            }
        }
        filtered.push(path);
    }

    Ok(filtered)
}

/// True when `pattern` excludes `filename`, following `.gitignore` rules:
/// - a pattern without an inner `/` matches at any depth
/// - a leading `/` anchors the pattern at `root_dir`
/// - a trailing `/` matches everything below a directory
/// - any other pattern also matches everything below a matching directory
pub fn exclude_file(pattern: &str, filename: &str, root_dir: &str) -> Result<bool> {
    let filename = match root_dir {
        "" => filename,
        root => filename.strip_prefix(root).unwrap_or(filename),
    };

    let mut pattern = pattern.to_string();
    let without_last = match pattern.char_indices().last() {
        Some((i, _)) => &pattern[..i],
        None => "",
    };
    if !without_last.contains('/') {
        pattern.insert_str(0, "**/");
    }

    let pattern = pattern.strip_prefix('/').unwrap_or(&pattern);

    let mut candidates = vec![pattern];
    if let Some(rest) = pattern.strip_prefix("**/") {
        candidates.push(rest);
    }

    let mut globs = Vec::with_capacity(candidates.len() * 2);
    for candidate in candidates {
        if candidate.ends_with('/') {
            globs.push(format!("{candidate}**"));
        } else if candidate.ends_with("**") {
            globs.push(candidate.to_string());
        } else {
            globs.push(candidate.to_string());
            globs.push(format!("{candidate}/**"));
        }
    }

    for glob in &globs {
        let matcher = GlobBuilder::new(glob)
            .literal_separator(true)
            .build()
            .map_err(|source| ConfigError::PatternCompile {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        if matcher.is_match(filename) {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded(pattern: &str, filename: &str) -> bool {
        exclude_file(pattern, filename, "").unwrap()
    }

    #[test]
    fn test_unanchored_pattern_matches_any_depth() {
        assert!(excluded("foo.rego", "foo.rego"));
        assert!(excluded("foo.rego", "bar/foo.rego"));
        assert!(excluded("*.rego", "a/b/c.rego"));
        assert!(!excluded("foo.rego", "bar/foobar.rego"));
    }

    #[test]
    fn test_anchored_pattern() {
        assert!(excluded("/bar/foo.rego", "bar/foo.rego"));
        assert!(excluded("bar/*.rego", "bar/x.rego"));
        assert!(!excluded("bar/*.rego", "baz/bar/x.rego"));
    }

    #[test]
    fn test_directory_patterns() {
        assert!(excluded("bar/", "bar/foo.rego"));
        assert!(excluded("bar/", "a/bar/foo.rego"));
        assert!(excluded("vendor", "vendor/lib/x.rego"));
        assert!(excluded("a/b/**", "a/b/c/d.rego"));
        assert!(!excluded("bar/", "barn/foo.rego"));
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        assert!(!excluded("/a/*.rego", "a/b/c.rego"));
        assert!(excluded("/a/**/*.rego", "a/b/c.rego"));
    }

    #[test]
    fn test_root_dir_is_stripped() {
        let paths = vec!["/work/policy/a.rego".to_string(), "/work/lib/b.rego".to_string()];
        let ignore = vec!["/policy/".to_string()];

        let filtered = filter_ignored_paths(&paths, &ignore, false, "/work").unwrap();
        assert_eq!(filtered, vec!["/work/lib/b.rego".to_string()]);
    }

    #[test]
    fn test_no_patterns_returns_input() {
        let paths = vec!["x.txt".to_string(), "does/not/exist.rego".to_string()];
        assert_eq!(filter_ignored_paths(&paths, &[], false, "").unwrap(), paths);
    }

    #[test]
    fn test_empty_patterns_are_skipped() {
        let paths = vec!["a.rego".to_string()];
        let ignore = vec![String::new()];
        assert_eq!(filter_ignored_paths(&paths, &ignore, false, "").unwrap(), paths);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = exclude_file("a[", "a.rego", "").unwrap_err();
        match err {
            ConfigError::PatternCompile { pattern, .. } => assert_eq!(pattern, "**/a["),
            other => panic!("unexpected error: {other}"),
        }
    }
}
