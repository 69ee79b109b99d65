//! In-memory drivers and a scripted surface shared by the integration tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::rc::Rc;

use ghostnav_core::mode::{S_IFDIR, S_IFLNK, S_IFREG};
use ghostnav_core::{
    CopyTarget, DirectoryReader, Entry, EntryStat, Event, FileCopier, Status, Surface, View,
};

pub const ROOT: u64 = 2;

pub fn dir(name: &str, id: u64) -> Entry {
    Entry::new(
        name,
        id,
        EntryStat {
            mode: S_IFDIR | 0o755,
            mtime: 1_118_836_800,
            atime: 1_118_836_800,
            ..Default::default()
        },
    )
}

pub fn file(name: &str, id: u64, size: u64) -> Entry {
    Entry::new(
        name,
        id,
        EntryStat {
            mode: S_IFREG | 0o644,
            size,
            ..Default::default()
        },
    )
}

pub fn symlink(name: &str, id: u64) -> Entry {
    Entry::new(
        name,
        id,
        EntryStat {
            mode: S_IFLNK | 0o777,
            ..Default::default()
        },
    )
}

/// Directory tree held in memory, keyed by directory identifier
#[derive(Clone, Default)]
pub struct MemoryTree {
    dirs: HashMap<u64, Vec<Entry>>,
    reads: Rc<RefCell<Vec<u64>>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directory `id` with `.`/`..` links followed by `children`
    pub fn with_dir(mut self, id: u64, parent: u64, children: Vec<Entry>) -> Self {
        let mut entries = vec![dir(".", id), dir("..", parent)];
        entries.extend(children);
        self.dirs.insert(id, entries);
        self
    }

    /// Add directory `id` with exactly `entries`, no links added
    pub fn with_raw_dir(mut self, id: u64, entries: Vec<Entry>) -> Self {
        self.dirs.insert(id, entries);
        self
    }

    /// Identifiers listed so far, in call order
    pub fn reads(&self) -> Rc<RefCell<Vec<u64>>> {
        Rc::clone(&self.reads)
    }
}

impl DirectoryReader for MemoryTree {
    fn root_id(&self) -> u64 {
        ROOT
    }

    fn read_dir(&self, id: u64) -> Result<Vec<Entry>> {
        self.reads.borrow_mut().push(id);
        match self.dirs.get(&id) {
            Some(entries) => Ok(entries.clone()),
            None => bail!("directory {} is unreadable", id),
        }
    }
}

/// Copy driver that writes nothing and fails for selected names
#[derive(Clone, Default)]
pub struct ScriptedCopier {
    failing: HashSet<String>,
    copied: Rc<RefCell<Vec<String>>>,
}

impl ScriptedCopier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Virtual paths handed to the driver, failures included
    pub fn copied(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.copied)
    }
}

impl FileCopier for ScriptedCopier {
    fn copy_file(&self, entry: &Entry, target: &CopyTarget<'_>) -> Result<()> {
        self.copied.borrow_mut().push(target.virtual_path.to_string());
        if self.failing.contains(entry.name()) {
            bail!("{} is unrecoverable", entry.name());
        }
        Ok(())
    }
}

/// What a surface was asked to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub path: String,
    pub is_root: bool,
    pub can_copy: bool,
    pub names: Vec<String>,
    pub offset: usize,
    pub selected: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub damaged: bool,
}

/// Replays a fixed list of events, then quits
#[derive(Default)]
pub struct ScriptedSurface {
    events: VecDeque<Event>,
    pub frames: Vec<Frame>,
    pub statuses: Vec<Status>,
}

impl ScriptedSurface {
    pub fn new(events: &[Event]) -> Self {
        Self {
            events: events.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn last_frame(&self) -> &Frame {
        self.frames.last().expect("nothing rendered")
    }
}

impl Surface for ScriptedSurface {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        self.frames.push(Frame {
            path: view.path.to_string(),
            is_root: view.is_root,
            can_copy: view.can_copy,
            names: view.entries.iter().map(|e| e.name().to_string()).collect(),
            offset: view.offset,
            selected: view.selected,
            has_previous: view.has_previous,
            has_next: view.has_next,
            damaged: view.is_damaged(),
        });
        Ok(())
    }

    fn read_event(&mut self) -> io::Result<Event> {
        Ok(self.events.pop_front().unwrap_or(Event::Quit))
    }

    fn show_status(&mut self, status: Status) -> io::Result<()> {
        self.statuses.push(status);
        Ok(())
    }
}
