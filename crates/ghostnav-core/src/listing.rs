/// Directory listing adapter and audit trail formatting
///
/// Wraps a [`DirectoryReader`] so that callers always get a usable listing:
/// reader failures become an empty listing, and entries whose names would
/// corrupt the virtual path are dropped.
use chrono::{Datelike, Local, TimeZone, Timelike};
use std::ops::RangeInclusive;

use crate::driver::DirectoryReader;
use crate::entry::{DirListing, Entry};
use crate::mode::format_mode;
use crate::path::SEPARATOR;

pub const AUDIT_TARGET: &str = "ghostnav::audit";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Shown instead of a date when the timestamp is unknown
const BLANK_DATE: &str = "                 ";

pub struct ListingSource {
    reader: Box<dyn DirectoryReader>,
}

impl ListingSource {
    pub fn new(reader: impl DirectoryReader + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn root_id(&self) -> u64 {
        self.reader.root_id()
    }

    /// List directory `id`. Never fails: an unreadable directory is empty.
    pub fn list(&self, id: u64) -> DirListing {
        match self.reader.read_dir(id) {
            Ok(entries) => entries
                .into_iter()
                .filter(|entry| {
                    let valid = !entry.name().is_empty() && !entry.name().contains(SEPARATOR);
                    if !valid {
                        tracing::warn!(
                            "Dropping entry with unusable name {:?} (inode {})",
                            entry.name(),
                            entry.id()
                        );
                    }
                    valid
                })
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to read directory inode {}: {:#}", id, e);
                DirListing::default()
            }
        }
    }
}

/// `%2d-%3s-%4d %02d:%02d` in local time, or 17 spaces when unknown
pub fn format_timestamp(secs: i64) -> String {
    match local_time(secs) {
        Some(t) => format!(
            "{:2}-{}-{:4} {:02}:{:02}",
            t.day(),
            MONTHS[t.month0() as usize],
            t.year(),
            t.hour(),
            t.minute()
        ),
        None => BLANK_DATE.to_string(),
    }
}

fn local_time(secs: i64) -> Option<chrono::DateTime<Local>> {
    if secs == 0 {
        return None;
    }
    Local.timestamp_opt(secs, 0).single()
}

/// Listing row without the inode column, as shown on screen
pub fn display_line(entry: &Entry) -> String {
    let stat = entry.stat();
    format!(
        "{} {:5} {:5}   {:7} {} {}",
        format_mode(stat.mode),
        stat.uid,
        stat.gid,
        stat.size,
        format_timestamp(stat.mtime),
        entry.name()
    )
}

/// Listing row as written to the audit trail
pub fn audit_line(entry: &Entry) -> String {
    let stat = entry.stat();
    format!(
        "{:7} {} {:5}  {:5}   {:7} {} {}",
        entry.id(),
        format_mode(stat.mode),
        stat.uid,
        stat.gid,
        stat.size,
        format_timestamp(stat.mtime),
        entry.name()
    )
}

/// Whether any entry was modified within `years` (local time)
pub fn has_recent_entry(listing: &DirListing, years: &RangeInclusive<i32>) -> bool {
    listing
        .iter()
        .filter_map(|entry| local_time(entry.stat().mtime))
        .any(|t| years.contains(&t.year()))
}

/// Write `listing` to the audit trail under a `Directory <path>` header.
///
/// Returns [`has_recent_entry`] for the same listing; callers use it as a
/// hint that the recovered dates look plausible.
pub fn audit_listing(path: &str, listing: &DirListing, years: &RangeInclusive<i32>) -> bool {
    tracing::info!(target: AUDIT_TARGET, "Directory {}", path);
    for entry in listing {
        tracing::info!(target: AUDIT_TARGET, "{}", audit_line(entry));
    }
    has_recent_entry(listing, years)
}
