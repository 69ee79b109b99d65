//! In-memory directory entries as produced by a directory reader

use serde::{Deserialize, Serialize};

use crate::mode;

/// Stat metadata carried by each entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStat {
    /// Type and permission bits, Linux layout
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    /// Seconds since the epoch, 0 when unknown
    pub mtime: i64,
    /// Seconds since the epoch, 0 when unknown
    pub atime: i64,
}

/// One member of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    name: String,
    id: u64,
    stat: EntryStat,
}

impl Entry {
    pub fn new(name: impl Into<String>, id: u64, stat: EntryStat) -> Self {
        Self {
            name: name.into(),
            id,
            stat,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the underlying object (inode number or equivalent)
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn stat(&self) -> &EntryStat {
        &self.stat
    }

    pub fn is_dir(&self) -> bool {
        mode::is_dir(self.stat.mode)
    }

    pub fn is_file(&self) -> bool {
        mode::is_reg(self.stat.mode)
    }

    /// `.` entry, which names the directory being listed
    pub fn is_self_link(&self) -> bool {
        self.name == "."
    }

    /// `..` entry, which names the parent directory
    pub fn is_parent_link(&self) -> bool {
        self.name == ".."
    }
}

/// Ordered contents of one directory, in the order the reader returned them.
///
/// A listing is owned by the frame that requested it and dropped when that
/// frame returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    entries: Vec<Entry>,
}

impl DirListing {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries from `offset`, at most `rows` of them
    pub fn page(&self, offset: usize, rows: usize) -> &[Entry] {
        let start = offset.min(self.entries.len());
        let end = start.saturating_add(rows).min(self.entries.len());
        &self.entries[start..end]
    }
}

impl<'a> IntoIterator for &'a DirListing {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Entry> for DirListing {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
