//! Drivers backed by a directory tree on the host filesystem
//!
//! Useful for browsing a mounted image or a tree produced by another
//! recovery pass. On Unix the identifiers are real inode numbers; elsewhere
//! they are assigned as directories are discovered.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use crate::dest;
use crate::driver::{CopyTarget, DirectoryReader, FileCopier};
use crate::entry::{Entry, EntryStat};
use crate::path::SEPARATOR;

/// What makes two host paths the same object
#[cfg(unix)]
type Key = (u64, u64);
#[cfg(not(unix))]
type Key = PathBuf;

/// Maps host objects to stable identifiers and back to a path.
///
/// On Unix an object keeps its inode number unless another device already
/// claimed it; the loser gets an id counted down from `u64::MAX`.
#[derive(Debug)]
struct Registry {
    by_id: HashMap<u64, PathBuf>,
    by_key: HashMap<Key, u64>,
    next_free: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            by_key: HashMap::new(),
            next_free: u64::MAX,
        }
    }
}

impl Registry {
    #[cfg(unix)]
    fn register(&mut self, path: &Path, meta: &Metadata) -> u64 {
        use std::os::unix::fs::MetadataExt;
        self.intern((meta.dev(), meta.ino()), Some(meta.ino()), path)
    }

    #[cfg(not(unix))]
    fn register(&mut self, path: &Path, _meta: &Metadata) -> u64 {
        self.intern(path.to_path_buf(), None, path)
    }

    fn intern(&mut self, key: Key, preferred: Option<u64>, path: &Path) -> u64 {
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }
        let id = match preferred {
            Some(id) if id != 0 && !self.by_id.contains_key(&id) => id,
            _ => self.allocate(),
        };
        self.by_key.insert(key, id);
        self.by_id.insert(id, path.to_path_buf());
        id
    }

    fn allocate(&mut self) -> u64 {
        while self.by_id.contains_key(&self.next_free) {
            self.next_free = self.next_free.wrapping_sub(1);
        }
        let id = self.next_free;
        self.next_free = self.next_free.wrapping_sub(1);
        id
    }
}

/// Lists directories of a host tree rooted at `root`
pub struct NativeReader {
    root: PathBuf,
    root_id: u64,
    registry: RefCell<Registry>,
}

impl NativeReader {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = fs::canonicalize(root.as_ref())
            .with_context(|| format!("canonicalize({})", root.as_ref().display()))?;
        let meta =
            fs::metadata(&root).with_context(|| format!("metadata({})", root.display()))?;
        if !meta.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }

        let mut registry = Registry::default();
        let root_id = registry.register(&root, &meta);
        tracing::debug!("Native root {} has inode {}", root.display(), root_id);

        Ok(Self {
            root,
            root_id,
            registry: RefCell::new(registry),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_for(&self, name: &str, path: &Path) -> io::Result<Entry> {
        let meta = fs::symlink_metadata(path)?;
        let id = self.registry.borrow_mut().register(path, &meta);
        Ok(Entry::new(name, id, stat_of(&meta)))
    }
}

impl DirectoryReader for NativeReader {
    fn root_id(&self) -> u64 {
        self.root_id
    }

    fn read_dir(&self, id: u64) -> Result<Vec<Entry>> {
        let dir = self
            .registry
            .borrow()
            .by_id
            .get(&id)
            .cloned()
            .with_context(|| format!("no directory known with inode {}", id))?;

        // The tree ends at the root: its parent is itself
        let parent = if dir == self.root {
            dir.clone()
        } else {
            dir.parent().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone())
        };

        let mut entries = vec![
            self.entry_for(".", &dir)
                .with_context(|| format!("stat({})", dir.display()))?,
            self.entry_for("..", &parent)
                .with_context(|| format!("stat({})", parent.display()))?,
        ];

        let mut children = fs::read_dir(&dir)
            .with_context(|| format!("read_dir({})", dir.display()))?
            .collect::<io::Result<Vec<_>>>()?;
        children.sort_by_key(|child| child.file_name());

        for child in children {
            let name = child.file_name().to_string_lossy().into_owned();
            match self.entry_for(&name, &child.path()) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping {}: {}", child.path().display(), e),
            }
        }
        Ok(entries)
    }
}

#[cfg(unix)]
fn stat_of(meta: &Metadata) -> EntryStat {
    use std::os::unix::fs::MetadataExt;
    EntryStat {
        mode: meta.mode(),
        uid: meta.uid(),
        gid: meta.gid(),
        size: meta.size(),
        mtime: meta.mtime(),
        atime: meta.atime(),
    }
}

#[cfg(not(unix))]
fn stat_of(meta: &Metadata) -> EntryStat {
    use crate::mode::{S_IFDIR, S_IFLNK, S_IFREG};
    use std::time::{SystemTime, UNIX_EPOCH};

    let kind = if meta.is_dir() {
        S_IFDIR
    } else if meta.file_type().is_symlink() {
        S_IFLNK
    } else {
        S_IFREG
    };
    let perms = if meta.permissions().readonly() { 0o555 } else { 0o755 };
    let secs = |t: io::Result<SystemTime>| {
        t.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    };
    EntryStat {
        mode: kind | perms,
        uid: 0,
        gid: 0,
        size: meta.len(),
        mtime: secs(meta.modified()),
        atime: secs(meta.accessed()),
    }
}

/// Copies regular files from a host tree, resolving virtual paths under `source_root`
pub struct NativeCopier {
    source_root: PathBuf,
}

impl NativeCopier {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }

    fn source_path(&self, virtual_path: &str) -> PathBuf {
        let relative = virtual_path.trim_start_matches(SEPARATOR);
        if relative.is_empty() {
            self.source_root.clone()
        } else {
            self.source_root.join(relative)
        }
    }
}

impl FileCopier for NativeCopier {
    fn copy_file(&self, entry: &Entry, target: &CopyTarget<'_>) -> Result<()> {
        let source = self.source_path(target.virtual_path);
        let mut input =
            File::open(&source).with_context(|| format!("open({})", source.display()))?;
        let mut output = dest::create_file(target.destination)
            .with_context(|| format!("create({})", target.destination.display()))?;

        let written = io::copy(&mut input, &mut output).with_context(|| {
            format!(
                "copy {} -> {}",
                source.display(),
                target.destination.display()
            )
        })?;
        drop(output);

        if written != entry.stat().size {
            tracing::warn!(
                "{}: copied {} bytes, listing recorded {}",
                target.virtual_path,
                written,
                entry.stat().size
            );
        }
        dest::set_date(target.destination, entry.stat().atime, entry.stat().mtime);
        Ok(())
    }
}
