/// Recursive extraction of recovered files and directories
///
/// Copies a subtree depth-first, creating each destination directory before
/// its children so empty directories survive. Extraction is not
/// transactional: whatever was written before a failure stays in place.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dest;
use crate::driver::{CopyTarget, FileCopier};
use crate::entry::Entry;
use crate::listing::ListingSource;
use crate::path::{destination_path, PathBuilder};
use crate::session::Session;

/// Aggregate result of copying an entry and everything below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyOutcome {
    AllCopied,
    PartialFailure,
    TotalFailure,
}

impl std::fmt::Display for CopyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyOutcome::AllCopied => write!(f, "all files copied"),
            CopyOutcome::PartialFailure => write!(f, "failed to copy some files"),
            CopyOutcome::TotalFailure => write!(f, "no file copied"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    copied: bool,
    failed: bool,
}

impl Tally {
    fn record(&mut self, outcome: CopyOutcome) {
        match outcome {
            CopyOutcome::AllCopied => self.copied = true,
            CopyOutcome::PartialFailure => {
                self.copied = true;
                self.failed = true;
            }
            CopyOutcome::TotalFailure => self.failed = true,
        }
    }

    fn outcome(self) -> CopyOutcome {
        match (self.copied, self.failed) {
            (_, false) => CopyOutcome::AllCopied,
            (true, true) => CopyOutcome::PartialFailure,
            (false, true) => CopyOutcome::TotalFailure,
        }
    }
}

/// Extraction result with per-run counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractReport {
    pub outcome: CopyOutcome,
    pub files_copied: usize,
    pub files_failed: usize,
    /// Destination directories that did not exist beforehand
    pub directories_created: usize,
    /// Children left out because their path would not fit
    pub entries_skipped: usize,
}

impl ExtractReport {
    fn failed() -> Self {
        Self {
            outcome: CopyOutcome::TotalFailure,
            files_copied: 0,
            files_failed: 0,
            directories_created: 0,
            entries_skipped: 0,
        }
    }
}

impl Session {
    /// Copy `entry` to the destination root.
    ///
    /// The current path must already name `entry`. Directories are copied
    /// recursively; regular files go straight to the copy driver; anything
    /// else cannot be copied. The current path is unchanged on return.
    pub fn extract(&mut self, entry: &Entry) -> ExtractReport {
        let (Some(root), Some(copier)) = (self.config.destination.as_deref(), self.copier.as_deref())
        else {
            tracing::warn!("Copy requested for {} without a destination", self.path);
            return ExtractReport::failed();
        };

        let mut extraction = Extraction {
            path: &mut self.path,
            source: &self.source,
            copier,
            root,
            ancestors: Vec::new(),
            report: ExtractReport::failed(),
        };

        let saved = extraction.path.len();
        let outcome = if entry.is_dir() {
            extraction.directory(entry)
        } else if entry.is_file() {
            extraction.file(entry)
        } else {
            tracing::warn!(
                "{} is neither a directory nor a regular file, not copied",
                extraction.path
            );
            CopyOutcome::TotalFailure
        };
        extraction.path.truncate(saved);

        let mut report = extraction.report;
        report.outcome = outcome;
        tracing::info!(
            "Extraction of {} finished: {} ({} copied, {} failed, {} directories)",
            self.path,
            outcome,
            report.files_copied,
            report.files_failed,
            report.directories_created
        );
        report
    }
}

struct Extraction<'a> {
    path: &'a mut PathBuilder,
    source: &'a ListingSource,
    copier: &'a dyn FileCopier,
    root: &'a Path,
    /// Identifiers of the directories being copied, outermost first
    ancestors: Vec<u64>,
    report: ExtractReport,
}

impl Extraction<'_> {
    fn directory(&mut self, dir: &Entry) -> CopyOutcome {
        let dest_dir = destination_path(self.root, self.path.as_str());
        let existed = dest_dir.is_dir();
        match dest::create_dir(&dest_dir) {
            Ok(()) if !existed => self.report.directories_created += 1,
            Ok(()) => {}
            Err(e) => tracing::warn!("Failed to create {}: {}", dest_dir.display(), e),
        }

        let listing = self.source.list(dir.id());
        let saved = self.path.len();
        let mut tally = Tally::default();
        self.ancestors.push(dir.id());

        for child in &listing {
            let loops_back = child.id() == dir.id()
                || child.is_self_link()
                || child.is_parent_link()
                || self.ancestors.contains(&child.id());
            if child.is_dir() && loops_back {
                if !child.is_self_link() && !child.is_parent_link() {
                    tracing::warn!(
                        "{} in {} points back to inode {}, not followed",
                        child.name(),
                        self.path,
                        child.id()
                    );
                }
                continue;
            }
            if !child.is_dir() && !child.is_file() {
                tracing::debug!("Skipping special file {} in {}", child.name(), self.path);
                continue;
            }
            if let Err(e) = self.path.append(child.name()) {
                tracing::warn!("Skipping {} in {}: {}", child.name(), self.path, e);
                self.report.entries_skipped += 1;
                continue;
            }

            let outcome = if child.is_dir() {
                self.directory(child)
            } else {
                self.file(child)
            };
            tally.record(outcome);
            self.path.truncate(saved);
        }
        self.ancestors.pop();

        dest::set_date(&dest_dir, dir.stat().atime, dir.stat().mtime);
        tally.outcome()
    }

    fn file(&mut self, entry: &Entry) -> CopyOutcome {
        let destination = destination_path(self.root, self.path.as_str());
        let target = CopyTarget {
            virtual_path: self.path.as_str(),
            destination: &destination,
        };
        match self.copier.copy_file(entry, &target) {
            Ok(()) => {
                tracing::debug!("Copied {} to {}", self.path, destination.display());
                self.report.files_copied += 1;
                CopyOutcome::AllCopied
            }
            Err(e) => {
                tracing::warn!("Failed to copy {}: {:#}", self.path, e);
                self.report.files_failed += 1;
                CopyOutcome::TotalFailure
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_outcomes() {
        assert_eq!(Tally::default().outcome(), CopyOutcome::AllCopied);

        let mut tally = Tally::default();
        tally.record(CopyOutcome::AllCopied);
        assert_eq!(tally.outcome(), CopyOutcome::AllCopied);
        tally.record(CopyOutcome::TotalFailure);
        assert_eq!(tally.outcome(), CopyOutcome::PartialFailure);

        let mut tally = Tally::default();
        tally.record(CopyOutcome::TotalFailure);
        tally.record(CopyOutcome::TotalFailure);
        assert_eq!(tally.outcome(), CopyOutcome::TotalFailure);
    }

    #[test]
    fn test_nested_partial_taints_parent() {
        let mut tally = Tally::default();
        tally.record(CopyOutcome::PartialFailure);
        assert_eq!(tally.outcome(), CopyOutcome::PartialFailure);
    }
}
