//! Navigation and extraction over directory trees recovered from damaged
//! filesystem images.
//!
//! A filesystem-specific [`DirectoryReader`] turns directory identifiers
//! into entries. On top of that, [`Navigator`] lets an operator walk the
//! reconstructed tree, and [`Session::extract`] copies files or whole
//! subtrees out through a [`FileCopier`].

pub mod dest;
pub mod driver;
pub mod entry;
pub mod error;
pub mod extract;
pub mod listing;
pub mod mode;
pub mod native;
pub mod navigator;
pub mod path;
pub mod session;

pub use driver::{CopyTarget, DirectoryReader, FileCopier};
pub use entry::{DirListing, Entry, EntryStat};
pub use error::{CapacityError, NavError, Result};
pub use extract::{CopyOutcome, ExtractReport};
pub use listing::{audit_line, display_line, format_timestamp, ListingSource, AUDIT_TARGET};
pub use mode::format_mode;
pub use native::{NativeCopier, NativeReader};
pub use navigator::{Event, NavOutcome, Navigator, Selection, Status, Surface, View};
pub use path::{encode_for_destination, PathBuilder, DEFAULT_PATH_CAPACITY};
pub use session::{Session, SessionConfig, DEFAULT_PAGE_ROWS, DEFAULT_RECENT_YEARS};
