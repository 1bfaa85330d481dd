//! Utility functions for word counting, checksums, timestamps, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace word counting for extracted text
//! - MD5 checksums and sizes for downloaded files
//! - Timestamp formatting for sidecars, logs, and reports
//! - String truncation for logging and filenames
//! - File system validation for the corpus root

use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::fs as stdfs;
use std::io::Read;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Count words by splitting on whitespace.
///
/// This is the only word count used anywhere in the corpus; nothing is
/// estimated.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count the words of a text file on disk.
///
/// Invalid UTF-8 is decoded lossily. An unreadable file counts as zero words.
pub fn word_count_in_file(path: &Path) -> usize {
    match stdfs::read(path) {
        Ok(bytes) => word_count(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read text file; counting 0 words");
            0
        }
    }
}

/// Compute the size and hex MD5 digest of a file.
pub fn file_size_and_md5(path: &Path) -> std::io::Result<(u64, String)> {
    let mut file = stdfs::File::open(path)?;
    let mut ctx = md5::Context::new();
    let mut buf = [0u8; 8192];
    let mut size = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        ctx.consume(&buf[..n]);
        size += n as u64;
    }
    Ok((size, format!("{:x}", ctx.compute())))
}

/// Current local time in RFC 3339, used for every `*_at` field.
pub fn now_iso() -> String {
    Local::now().to_rfc3339()
}

/// Compact local timestamp for file names, e.g. `20260119_142501`.
pub fn run_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Serialize `value` as pretty JSON with a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Write `value` as pretty JSON, creating parent directories.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, to_pretty_json(value)?).await?;
    Ok(())
}

/// Create `path` if needed and check that files can be written in it.
///
/// A probe file is created and removed again. Fails when the directory cannot
/// be created or the probe cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Corpus root is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("one two\nthree\tfour  five\r\n"), 5);
        assert_eq!(word_count("[Page 1]\nGaúcho politics"), 4);
    }

    #[test]
    fn test_word_count_in_missing_file_is_zero() {
        assert_eq!(word_count_in_file(Path::new("/definitely/not/here.txt")), 0);
    }

    #[test]
    fn test_file_size_and_md5() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("hello.txt");
        stdfs::write(&path, b"hello world").unwrap();

        let (size, digest) = file_size_and_md5(&path).unwrap();
        assert_eq!(size, 11);
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let result = truncate_for_log("Cortés", 5);
        assert_eq!(result, "Cort…(+3 bytes)");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 80), "abc");
        assert_eq!(truncate_chars("Gaúcho", 3), "Gaú");
    }

    #[test]
    fn test_pretty_json_ends_with_newline() {
        let json = to_pretty_json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(json, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_run_stamp_shape() {
        let stamp = run_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
