//! Interfaces implemented by filesystem-specific drivers
//!
//! A directory reader knows how to decode one on-disk format into entries; a
//! file copier knows how to stream one regular file out of it. Neither is
//! expected to know anything about navigation or extraction.

use anyhow::Result;
use std::path::Path;

use crate::entry::Entry;

/// Decodes directories of one filesystem into entries
pub trait DirectoryReader {
    /// Identifier of the filesystem root directory
    fn root_id(&self) -> u64;

    /// List the directory identified by `id`, in on-disk order.
    ///
    /// Must be deterministic for a given `id` within one run, and should
    /// include `.` and `..` when the format records them. A damaged
    /// directory may legitimately yield an empty list.
    fn read_dir(&self, id: u64) -> Result<Vec<Entry>>;
}

/// Source and destination of a single file copy
#[derive(Debug, Clone, Copy)]
pub struct CopyTarget<'a> {
    /// Virtual path of the file inside the recovered tree, name included
    pub virtual_path: &'a str,
    /// Where the file must be written on the host filesystem
    pub destination: &'a Path,
}

/// Streams regular files out of a filesystem
pub trait FileCopier {
    /// Copy `entry` to `target.destination`, preserving its length.
    ///
    /// Restoring the file's own timestamps is up to the implementation.
    fn copy_file(&self, entry: &Entry, target: &CopyTarget<'_>) -> Result<()>;
}
