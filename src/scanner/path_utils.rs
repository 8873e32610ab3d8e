//! Path normalization for indexed paths.
//!
//! Every path stored in the index is absolute with `.` and `..` resolved
//! lexically, so one file reached through different spellings is recorded
//! once.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root or a drive prefix. Symbolic links are
/// not resolved.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use dupecache::scanner::path_utils::normalize_path;
///
/// let path = normalize_path(Path::new("/data/photos/../music/./a.mp3"));
/// assert_eq!(path, PathBuf::from("/data/music/a.mp3"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
        }
    }
    normalized
}

/// Make `path` absolute against the current directory, then normalize it.
///
/// # Errors
///
/// Fails if `path` is relative and the current directory cannot be read.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path).map(|path| normalize_path(&path))
}
