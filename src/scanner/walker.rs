//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and yielding every regular file beneath it. There is no filtering
//! by name, extension or size: the index hashes everything it is given.
//!
//! Entries are yielded in file-name order within each directory so that
//! repeated scans of the same tree visit files in the same sequence.
//!
//! # Symlinks
//!
//! By default symbolic links are not followed, so symlinked files and
//! directories are skipped. With [`WalkerConfig::follow_symlinks`] set,
//! walkdir resolves them and reports cycles as [`ScanError::SymlinkLoop`]
//! instead of recursing forever.
//!
//! # Example
//!
//! ```no_run
//! use dupecache::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Documents"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ScanError, WalkerConfig};

/// Directory walker for regular-file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root directory of this walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree, yielding regular file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration, so one unreadable directory does not end the walk.
    /// Paths are joined onto the root, so an absolute root yields
    /// absolute paths.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    // With follow_links the file type is that of the target.
                    if entry.file_type().is_file() {
                        Some(Ok(entry.into_path()))
                    } else {
                        if entry.path_is_symlink() && !self.config.follow_symlinks {
                            log::trace!("Skipping symlink: {}", entry.path().display());
                        }
                        None
                    }
                }
                Err(e) => Some(Err(self.convert_error(e))),
            })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn convert_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            return ScanError::SymlinkLoop {
                path,
                ancestor: ancestor.to_path_buf(),
            };
        }

        match error.into_io_error() {
            Some(source) if source.kind() == std::io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied(path)
            }
            Some(source) => ScanError::Io { path, source },
            None => ScanError::Io {
                path,
                source: std::io::Error::other("directory walk failed"),
            },
        }
    }
}
