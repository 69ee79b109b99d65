//! Helpers for writing extracted data to the host filesystem

use filetime::FileTime;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Create (or truncate) `path` for writing.
///
/// When the first attempt fails the missing parent directories are created
/// and the open is retried once.
pub fn create_file(path: &Path) -> io::Result<File> {
    match File::create(path) {
        Ok(file) => Ok(file),
        Err(first) => {
            let Some(parent) = path.parent() else {
                return Err(first);
            };
            fs::create_dir_all(parent)?;
            File::create(path)
        }
    }
}

/// Create `path` and every missing parent. An existing directory is fine.
pub fn create_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Give `path` the access and modification times recorded on disk.
///
/// Returns `false` and logs when the times could not be applied.
pub fn set_date(path: &Path, atime: i64, mtime: i64) -> bool {
    let accessed = FileTime::from_unix_time(atime, 0);
    let modified = FileTime::from_unix_time(mtime, 0);
    match filetime::set_file_times(path, accessed, modified) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                "Couldn't set the file's date and time for {}: {}",
                path.display(),
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_create_file_makes_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a/b/c.txt");

        let mut file = create_file(&path).unwrap();
        file.write_all(b"data").unwrap();
        drop(file);

        assert_eq!(fs::read(&path).unwrap(), b"data");
    }

    #[test]
    fn test_create_dir_tolerates_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x/y");
        create_dir(&path).unwrap();
        create_dir(&path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_set_date() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("d");
        create_dir(&dir).unwrap();

        assert!(set_date(&dir, 1_000_000_000, 1_100_000_000));
        let meta = fs::metadata(&dir).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&meta).unix_seconds(),
            1_100_000_000
        );
    }

    #[test]
    fn test_set_date_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!set_date(&temp_dir.path().join("missing"), 1, 1));
    }
}
