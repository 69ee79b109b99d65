//! Interactive tree navigator
//!
//! Each directory level is one stack frame: it lists the directory, lets the
//! operator move around, and recurses when the operator enters a child. The
//! frame's saved path length is the undo record for going back.

use std::io;

use crate::entry::{DirListing, Entry};
use crate::error::{NavError, Result};
use crate::extract::CopyOutcome;
use crate::session::Session;

/// Abstract input event, independent of the input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Up,
    Down,
    PageUp,
    PageDown,
    /// Enter the selected directory
    Enter,
    /// Go back one level
    Back,
    /// Copy the selected entry
    Copy,
    Quit,
}

/// Transient message shown below the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Copying,
    Copied(CopyOutcome),
    PathTooLong,
}

/// Everything needed to draw one page of a directory
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub path: &'a str,
    pub is_root: bool,
    pub can_copy: bool,
    /// Visible rows, starting at `offset`
    pub entries: &'a [Entry],
    pub offset: usize,
    /// Absolute index of the highlighted entry
    pub selected: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl View<'_> {
    /// An empty listing means the directory could not be decoded
    pub fn is_damaged(&self) -> bool {
        self.entries.is_empty() && self.offset == 0
    }
}

/// Interactive display: renders pages and reads operator input
pub trait Surface {
    fn render(&mut self, view: &View<'_>) -> io::Result<()>;

    /// Block until the next bound input event
    fn read_event(&mut self) -> io::Result<Event>;

    fn show_status(&mut self, status: Status) -> io::Result<()>;
}

/// How a navigation frame ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The operator aborted; every frame unwinds
    Quit,
    /// Resume at the parent level
    Back,
    /// Enter the directory with this identifier
    Descend(u64),
}

/// Highlighted row and first visible row of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub pos: usize,
    pub offset: usize,
}

impl Selection {
    pub fn up(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
        if self.pos < self.offset {
            self.offset -= 1;
        }
    }

    pub fn down(&mut self, len: usize, rows: usize) {
        if self.pos + 1 < len {
            self.pos += 1;
        }
        if self.pos >= self.offset + rows {
            self.offset += 1;
        }
    }

    /// Move up by one page, keeping one row of overlap
    pub fn page_up(&mut self, rows: usize) {
        for _ in 0..page_step(rows) {
            if self.pos == 0 {
                break;
            }
            self.up();
        }
    }

    /// Move down by one page, keeping one row of overlap
    pub fn page_down(&mut self, len: usize, rows: usize) {
        for _ in 0..page_step(rows) {
            if self.pos + 1 >= len {
                break;
            }
            self.down(len, rows);
        }
    }
}

fn page_step(rows: usize) -> usize {
    rows.saturating_sub(1).max(1)
}

pub struct Navigator<'s> {
    session: &'s mut Session,
    surface: Option<&'s mut dyn Surface>,
}

impl<'s> Navigator<'s> {
    /// Without a surface the navigator only lists and audits the start directory.
    pub fn new(session: &'s mut Session, surface: Option<&'s mut dyn Surface>) -> Self {
        Self { session, surface }
    }

    /// Browse from `start`, or from the filesystem root when `None`.
    ///
    /// The session's current path is unchanged when this returns.
    pub fn run(&mut self, start: Option<u64>) -> Result<NavOutcome> {
        let start = start.unwrap_or_else(|| self.session.root_id());
        let saved = self.session.path.len();
        let outcome = self.browse(start, true);
        self.session.path.truncate(saved);
        outcome
    }

    fn browse(&mut self, id: u64, is_root: bool) -> Result<NavOutcome> {
        if self.session.verbosity() > 0 {
            tracing::info!("dir_partition inode={}", id);
        }
        let listing = self.session.list(id);
        if self.session.audit(&listing) {
            tracing::debug!("{} holds dates in the recent window", self.session.path);
        }

        let mut selection = Selection::default();
        loop {
            let saved = self.session.path.len();
            let Some(surface) = self.surface.as_deref_mut() else {
                return Ok(NavOutcome::Quit);
            };
            let step = interact(self.session, surface, &listing, id, is_root, &mut selection)?;

            let NavOutcome::Descend(child) = step else {
                return Ok(step);
            };
            let outcome = self.browse(child, false);
            self.session.path.truncate(saved);
            match outcome? {
                NavOutcome::Quit => return Ok(NavOutcome::Quit),
                NavOutcome::Back | NavOutcome::Descend(_) => {}
            }
        }
    }
}

/// Handle input for one directory until it asks to leave the level.
///
/// A `Descend` result has already appended the child's name to the path.
fn interact(
    session: &mut Session,
    surface: &mut dyn Surface,
    listing: &DirListing,
    id: u64,
    is_root: bool,
    selection: &mut Selection,
) -> Result<NavOutcome> {
    let rows = session.config.page_rows;
    loop {
        let entries = listing.page(selection.offset, rows);
        let view = View {
            path: session.current_path(),
            is_root,
            can_copy: session.can_copy(),
            entries,
            offset: selection.offset,
            selected: selection.pos,
            has_previous: selection.offset > 0,
            has_next: selection.offset + entries.len() < listing.len(),
        };
        surface.render(&view).map_err(NavError::Surface)?;

        let event = surface.read_event().map_err(NavError::Surface)?;
        match event {
            Event::Quit => return Ok(NavOutcome::Quit),
            Event::Back if !is_root => return Ok(NavOutcome::Back),
            Event::Back => {}
            _ if listing.is_empty() => {}
            Event::Up => selection.up(),
            Event::Down => selection.down(listing.len(), rows),
            Event::PageUp => selection.page_up(rows),
            Event::PageDown => selection.page_down(listing.len(), rows),
            Event::Enter => {
                if let Some(entry) = listing.get(selection.pos) {
                    if let Some(outcome) = enter(session, entry, id) {
                        return Ok(outcome);
                    }
                }
            }
            Event::Copy => {
                if let Some(entry) = listing.get(selection.pos) {
                    copy_entry(session, surface, entry)?;
                }
            }
        }
    }
}

/// Decide what entering `entry` from directory `id` means.
///
/// `None` keeps the operator on the current level.
fn enter(session: &mut Session, entry: &Entry, id: u64) -> Option<NavOutcome> {
    if !entry.is_dir() || entry.id() == id || entry.is_self_link() {
        return None;
    }
    if entry.is_parent_link() {
        return Some(NavOutcome::Back);
    }
    match session.path.append(entry.name()) {
        Ok(()) => Some(NavOutcome::Descend(entry.id())),
        Err(e) => {
            tracing::warn!("Cannot enter {} from {}: {}", entry.name(), session.path, e);
            None
        }
    }
}

/// Copy `entry` and report the outcome on the surface.
///
/// `.` copies the current directory itself; `..` is ignored.
fn copy_entry(session: &mut Session, surface: &mut dyn Surface, entry: &Entry) -> Result<()> {
    if !session.can_copy() || entry.is_parent_link() {
        return Ok(());
    }

    let saved = session.path.len();
    if !entry.is_self_link() {
        if let Err(e) = session.path.append(entry.name()) {
            tracing::warn!("Cannot copy {} from {}: {}", entry.name(), session.path, e);
            return surface
                .show_status(Status::PathTooLong)
                .map_err(NavError::Surface);
        }
    }

    if let Err(e) = surface.show_status(Status::Copying) {
        session.path.truncate(saved);
        return Err(NavError::Surface(e));
    }
    let report = session.extract(entry);
    session.path.truncate(saved);

    surface
        .show_status(Status::Copied(report.outcome))
        .map_err(NavError::Surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_scrolls_down() {
        let mut sel = Selection::default();
        for _ in 0..3 {
            sel.down(10, 3);
        }
        assert_eq!(sel, Selection { pos: 3, offset: 1 });
    }

    #[test]
    fn test_selection_stops_at_ends() {
        let mut sel = Selection::default();
        sel.up();
        assert_eq!(sel, Selection::default());

        for _ in 0..10 {
            sel.down(2, 5);
        }
        assert_eq!(sel.pos, 1);
        assert_eq!(sel.offset, 0);
    }

    #[test]
    fn test_selection_scrolls_up() {
        let mut sel = Selection { pos: 4, offset: 4 };
        sel.up();
        assert_eq!(sel, Selection { pos: 3, offset: 3 });
    }

    #[test]
    fn test_page_moves() {
        let mut sel = Selection::default();
        sel.page_down(20, 5);
        assert_eq!(sel, Selection { pos: 4, offset: 0 });
        sel.page_down(20, 5);
        assert_eq!(sel, Selection { pos: 8, offset: 4 });
        sel.page_up(5);
        assert_eq!(sel, Selection { pos: 4, offset: 4 });
        sel.page_up(5);
        assert_eq!(sel, Selection { pos: 0, offset: 0 });
    }

    #[test]
    fn test_page_down_clamps() {
        let mut sel = Selection::default();
        sel.page_down(3, 10);
        assert_eq!(sel.pos, 2);
    }

    #[test]
    fn test_single_row_pages() {
        let mut sel = Selection::default();
        sel.page_down(5, 1);
        assert_eq!(sel, Selection { pos: 1, offset: 1 });
    }
}
