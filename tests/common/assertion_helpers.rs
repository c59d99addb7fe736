//! Assertion helpers for testing
//!
//! Custom assertion macros and helper functions for provisioned files and
//! activity logs.

use std::path::Path;

/// Assert that a file exists
#[macro_export]
macro_rules! assert_file_exists {
    ($path:expr) => {
        assert!($path.exists(), "File should exist: {}", $path.display());
    };
    ($path:expr, $msg:expr) => {
        assert!($path.exists(), "{}: {}", $msg, $path.display());
    };
}

/// Assert that a file does not exist
#[macro_export]
macro_rules! assert_file_not_exists {
    ($path:expr) => {
        assert!(
            !$path.exists(),
            "File should not exist: {}",
            $path.display()
        );
    };
    ($path:expr, $msg:expr) => {
        assert!(!$path.exists(), "{}: {}", $msg, $path.display());
    };
}

/// Assert that file content matches expected content exactly
#[macro_export]
macro_rules! assert_file_content {
    ($path:expr, $expected:expr) => {
        let content = std::fs::read_to_string($path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", $path.display(), e));
        pretty_assertions::assert_eq!(
            content.as_str(),
            $expected,
            "File content mismatch in: {}",
            $path.display()
        );
    };
}

/// Assert that file content contains expected substring
#[macro_export]
macro_rules! assert_file_contains {
    ($path:expr, $expected:expr) => {
        let content = std::fs::read_to_string($path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", $path.display(), e));
        assert!(
            content.contains($expected),
            "File should contain '{}' in: {}\n{}",
            $expected,
            $path.display(),
            content
        );
    };
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => panic!("{}: {:?}", $msg, err),
        }
    };
}

/// Assert that the activity log holds a line containing `needle`
pub fn assert_activity_contains(lines: &[String], needle: &str) {
    assert!(
        lines.iter().any(|line| line.contains(needle)),
        "Activity should contain '{}':\n{}",
        needle,
        lines.join("\n")
    );
}

/// Assert that no activity line contains `needle`
pub fn assert_activity_lacks(lines: &[String], needle: &str) {
    assert!(
        !lines.iter().any(|line| line.contains(needle)),
        "Activity should not contain '{}':\n{}",
        needle,
        lines.join("\n")
    );
}

/// Number of activity lines containing `needle`
pub fn count_activity(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|line| line.contains(needle)).count()
}

/// Assert the permission bits of a file
#[cfg(unix)]
pub fn assert_mode(path: &Path, expected: u32) {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("Failed to stat {}: {}", path.display(), e))
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(
        mode,
        expected,
        "Mode mismatch for {}: {:o} != {:o}",
        path.display(),
        mode,
        expected
    );
}
