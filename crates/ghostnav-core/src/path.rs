//! Bounded virtual path used while walking a recovered tree
//!
//! The navigator and the extraction engine share one buffer: a frame records
//! `len()`, appends a child name, recurses, then truncates back.

use std::path::{Path, PathBuf};

use crate::error::CapacityError;

pub const SEPARATOR: char = '/';

/// Default capacity in bytes, matching the usual PATH_MAX
pub const DEFAULT_PATH_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBuilder {
    buf: String,
    capacity: usize,
}

impl PathBuilder {
    /// Create a builder holding the root separator.
    ///
    /// A capacity below one byte is raised to one so the root always fits.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut buf = String::with_capacity(capacity);
        buf.push(SEPARATOR);
        Self { buf, capacity }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_root(&self) -> bool {
        self.buf.len() == 1
    }

    /// Append `segment`, preceded by a separator unless the buffer is the root.
    ///
    /// Nothing is written when the result would exceed the capacity.
    pub fn append(&mut self, segment: &str) -> Result<(), CapacityError> {
        let separator = if self.is_root() { 0 } else { SEPARATOR.len_utf8() };
        let needed = self.buf.len() + separator + segment.len();
        if needed > self.capacity {
            return Err(CapacityError {
                needed,
                capacity: self.capacity,
            });
        }
        if separator > 0 {
            self.buf.push(SEPARATOR);
        }
        self.buf.push_str(segment);
        Ok(())
    }

    /// Reset to a length previously returned by [`PathBuilder::len`].
    ///
    /// Lengths past the end are ignored; the root separator is never removed.
    pub fn truncate(&mut self, saved_len: usize) {
        let mut len = saved_len.max(1);
        if len >= self.buf.len() {
            return;
        }
        while !self.buf.is_char_boundary(len) {
            len -= 1;
        }
        self.buf.truncate(len);
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PATH_CAPACITY)
    }
}

impl std::fmt::Display for PathBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buf)
    }
}

/// Re-encode a virtual path for the host filesystem's naming rules.
///
/// Control characters never survive; on Windows the reserved punctuation is
/// replaced as well. Separators are kept.
pub fn encode_for_destination(path: &str) -> String {
    path.chars()
        .map(|c| if is_reserved(c) { '_' } else { c })
        .collect()
}

#[cfg(windows)]
fn is_reserved(c: char) -> bool {
    c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\\')
}

#[cfg(not(windows))]
fn is_reserved(c: char) -> bool {
    c.is_control()
}

/// Where a virtual path lands under the destination root
pub fn destination_path(root: &Path, virtual_path: &str) -> PathBuf {
    let encoded = encode_for_destination(virtual_path);
    let relative = encoded.trim_start_matches(SEPARATOR);
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_root() {
        let path = PathBuilder::default();
        assert_eq!(path.as_str(), "/");
        assert!(path.is_root());
        assert_eq!(path.capacity(), DEFAULT_PATH_CAPACITY);
    }

    #[test]
    fn test_append_separators() {
        let mut path = PathBuilder::default();
        path.append("home").unwrap();
        assert_eq!(path.as_str(), "/home");
        path.append("user").unwrap();
        assert_eq!(path.as_str(), "/home/user");
    }

    #[test]
    fn test_append_truncate_restores() {
        let mut path = PathBuilder::default();
        path.append("home").unwrap();
        let before = path.as_str().to_string();
        let saved = path.len();

        path.append("documents").unwrap();
        path.append("report.pdf").unwrap();
        path.truncate(saved);

        assert_eq!(path.as_str(), before);
    }

    #[test]
    fn test_overflow_leaves_buffer_unchanged() {
        let mut path = PathBuilder::with_capacity(10);
        path.append("abcd").unwrap();
        assert_eq!(path.as_str(), "/abcd");

        let err = path.append("efghij").unwrap_err();
        assert_eq!(err.needed, 12);
        assert_eq!(err.capacity, 10);
        assert_eq!(path.as_str(), "/abcd");
    }

    #[test]
    fn test_append_exactly_fills() {
        let mut path = PathBuilder::with_capacity(6);
        path.append("abcde").unwrap();
        assert_eq!(path.len(), 6);
        assert!(path.append("x").is_err());
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut path = PathBuilder::with_capacity(32);
        let mut saved = Vec::new();
        for i in 0..20 {
            saved.push(path.len());
            let _ = path.append(&"x".repeat(i % 7 + 1));
            assert!(path.len() <= path.capacity());
        }
        while let Some(len) = saved.pop() {
            path.truncate(len);
            assert!(path.len() <= path.capacity());
        }
        assert_eq!(path.as_str(), "/");
    }

    #[test]
    fn test_truncate_keeps_root() {
        let mut path = PathBuilder::default();
        path.append("etc").unwrap();
        path.truncate(0);
        assert_eq!(path.as_str(), "/");
        path.truncate(100);
        assert_eq!(path.as_str(), "/");
    }

    #[test]
    fn test_truncate_on_multibyte_boundary() {
        let mut path = PathBuilder::default();
        path.append("héllo").unwrap();
        path.truncate(3);
        assert_eq!(path.as_str(), "/h");
    }

    #[test]
    fn test_encode_strips_control_characters() {
        assert_eq!(encode_for_destination("/a\u{1}b/c"), "/a_b/c");
        assert_eq!(encode_for_destination("/plain/name.txt"), "/plain/name.txt");
    }

    #[test]
    fn test_destination_path() {
        let root = Path::new("/tmp/out");
        assert_eq!(destination_path(root, "/"), PathBuf::from("/tmp/out"));
        assert_eq!(
            destination_path(root, "/docs/a.txt"),
            PathBuf::from("/tmp/out/docs/a.txt")
        );
    }
}
