//! Browsing/extraction session
//!
//! A session binds the drivers, the destination root and the shared virtual
//! path for one run. It lives as long as the operator keeps browsing.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::driver::{DirectoryReader, FileCopier};
use crate::entry::DirListing;
use crate::error::{NavError, Result};
use crate::listing::{self, ListingSource};
use crate::path::{PathBuilder, DEFAULT_PATH_CAPACITY};

/// Rows shown per page by the interactive surface
pub const DEFAULT_PAGE_ROWS: usize = 12;

/// Years in which a recovered modification date is considered plausible
pub const DEFAULT_RECENT_YEARS: RangeInclusive<i32> = 2000..=2010;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Above zero, navigation emits diagnostic log lines
    pub verbosity: u8,
    /// Host directory receiving extracted files; `None` means browse only
    pub destination: Option<PathBuf>,
    /// Maximum length of the virtual path in bytes
    pub path_capacity: usize,
    pub page_rows: usize,
    pub recent_years: RangeInclusive<i32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            destination: None,
            path_capacity: DEFAULT_PATH_CAPACITY,
            page_rows: DEFAULT_PAGE_ROWS,
            recent_years: DEFAULT_RECENT_YEARS,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_rows == 0 {
            return Err(NavError::InvalidConfig(
                "page_rows must be at least 1".to_string(),
            ));
        }
        if self.path_capacity < 2 {
            return Err(NavError::InvalidConfig(format!(
                "path_capacity {} cannot hold any name",
                self.path_capacity
            )));
        }
        if self.recent_years.is_empty() {
            return Err(NavError::InvalidConfig(format!(
                "recent year window {}..={} is empty",
                self.recent_years.start(),
                self.recent_years.end()
            )));
        }
        Ok(())
    }
}

pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) path: PathBuilder,
    pub(crate) source: ListingSource,
    pub(crate) copier: Option<Box<dyn FileCopier>>,
}

impl Session {
    pub fn new(config: SessionConfig, reader: impl DirectoryReader + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            path: PathBuilder::with_capacity(config.path_capacity),
            source: ListingSource::new(reader),
            copier: None,
            config,
        })
    }

    /// Bind the driver used to copy regular files out
    pub fn with_copier(mut self, copier: impl FileCopier + 'static) -> Self {
        self.copier = Some(Box::new(copier));
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_path(&self) -> &str {
        self.path.as_str()
    }

    pub fn path(&self) -> &PathBuilder {
        &self.path
    }

    pub fn path_mut(&mut self) -> &mut PathBuilder {
        &mut self.path
    }

    pub fn destination(&self) -> Option<&Path> {
        self.config.destination.as_deref()
    }

    pub fn verbosity(&self) -> u8 {
        self.config.verbosity
    }

    /// Copying needs both a destination root and a copy driver
    pub fn can_copy(&self) -> bool {
        self.config.destination.is_some() && self.copier.is_some()
    }

    pub fn root_id(&self) -> u64 {
        self.source.root_id()
    }

    pub fn list(&self, id: u64) -> DirListing {
        self.source.list(id)
    }

    /// Write `listing` to the audit trail for the current path.
    ///
    /// Returns whether any entry falls in the configured recent-year window.
    pub fn audit(&self, listing: &DirListing) -> bool {
        listing::audit_listing(self.path.as_str(), listing, &self.config.recent_years)
    }
}
