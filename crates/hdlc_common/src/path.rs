//! Canonical path value type with captured mtime/size for staleness checks.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// An absolute filesystem path plus a captured mtime/size pair.
///
/// Two `SourcePath` values with the same absolute string but different
/// captured times are different *versions* of the same file — but equality,
/// hashing, and ordering compare only the path string, never the timestamp,
/// so a `SourcePath` is stable as a map key across re-parses. Cloning is
/// cheap: the path string is shared behind an `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourcePath {
    abs: Arc<PathBuf>,
    mtime: SystemTime,
    size: u64,
}

impl SourcePath {
    /// Captures the current mtime/size of `path` from disk.
    ///
    /// `path` is converted to absolute form relative to the process's
    /// current directory if it is not already absolute.
    pub fn capture(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let meta = std::fs::metadata(&abs)?;
        Ok(Self {
            abs: Arc::new(abs),
            mtime: meta.modified()?,
            size: meta.len(),
        })
    }

    /// Builds a `SourcePath` for a file that may not exist on disk, using a
    /// placeholder mtime/size. Used when config references a missing file —
    /// the DB still needs a stable key to report "file not found" against.
    pub fn missing(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        Self {
            abs: Arc::new(abs),
            mtime: SystemTime::UNIX_EPOCH,
            size: 0,
        }
    }

    /// The absolute path.
    pub fn as_path(&self) -> &Path {
        &self.abs
    }

    /// The mtime captured when this value was created.
    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// The byte size captured when this value was created.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Re-stats the file on disk and reports whether its mtime or size
    /// differs from what was captured — invariant I3's enforcement point.
    pub fn is_stale(&self) -> bool {
        match std::fs::metadata(&*self.abs) {
            Ok(meta) => {
                meta.modified().ok() != Some(self.mtime) || meta.len() != self.size
            }
            Err(_) => true,
        }
    }

    /// Returns `true` if the path currently exists on disk.
    pub fn exists(&self) -> bool {
        self.abs.exists()
    }
}

impl PartialEq for SourcePath {
    fn eq(&self, other: &Self) -> bool {
        self.abs == other.abs
    }
}

impl Eq for SourcePath {}

impl std::hash::Hash for SourcePath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.abs.hash(state);
    }
}

impl PartialOrd for SourcePath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourcePath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.abs.cmp(&other.abs)
    }
}

impl std::fmt::Display for SourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abs.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn equality_ignores_mtime_difference() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.vhd");
        fs::write(&file, "entity foo is end;").unwrap();

        let first = SourcePath::capture(&file).unwrap();
        // Touch the file with new content so mtime/size may change.
        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&file, "entity foo is end; -- extended").unwrap();
        let second = SourcePath::capture(&file).unwrap();

        assert_eq!(first, second, "equality must use only the path string");
    }

    #[test]
    fn stale_detects_content_change() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.vhd");
        fs::write(&file, "entity foo is end;").unwrap();

        let captured = SourcePath::capture(&file).unwrap();
        assert!(!captured.is_stale());

        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&file, "entity foo is end; -- changed content length").unwrap();
        assert!(captured.is_stale());
    }

    #[test]
    fn missing_file_is_always_stale() {
        let path = SourcePath::missing("/nonexistent/path/does/not/exist.vhd");
        assert!(path.is_stale());
        assert!(!path.exists());
    }

    #[test]
    fn ordering_is_by_path_string() {
        let a = SourcePath::missing("/a.vhd");
        let b = SourcePath::missing("/b.vhd");
        assert!(a < b);
    }
}
