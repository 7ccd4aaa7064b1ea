//! Utility functions for string handling, URLs, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe truncation for snippets and log previews
//! - Domain extraction for competitor URLs
//! - File system validation for the output directory

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Borrow at most `max` characters of `s`.
///
/// Unlike byte slicing this never splits a multi-byte character, which
/// matters for the Chinese snippets returned by search.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("比亚迪海豹", 3), "比亚迪");
/// assert_eq!(truncate_chars("abc", 10), "abc");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// The original string if it fits, otherwise a truncated version
/// with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let head = truncate_chars(s, max);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}

/// Host part of a URL, e.g. `https://www.view.com/about` -> `www.view.com`.
///
/// A non-default port is kept (`http://h:8080/` -> `h:8080`). Input that does
/// not parse as a URL with a host is returned unchanged.
pub fn domain_of(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| {
            u.host_str().map(|host| match u.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            })
        })
        .unwrap_or_else(|| raw.to_string())
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
