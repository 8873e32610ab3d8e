//! Content-hash cache for dupecache.
//!
//! This module holds the file index: an in-memory mapping from content
//! fingerprint to the set of paths sharing it, together with its binary
//! persistence format.
//!
//! # Architecture
//!
//! * [`index`]: [`FileIndex`], the mapping plus every add, query, save and
//!   load operation.
//! * [`codec`]: Length-prefixed binary encoding of cache files.
//! * [`entry`]: Decoded on-disk entries, staged before they are applied.
//! * [`sink`]: The optional diagnostic sink an index reports through.
//!
//! # Cache Invalidation
//!
//! There is none beyond existence checks. Loading with `verify` drops paths
//! that no longer exist; it never picks up new files or re-hashes modified
//! ones. Rebuild the cache for that.

pub mod codec;
pub mod entry;
pub mod index;
pub mod sink;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use codec::{CodecError, CACHE_VERSION};
pub use entry::CacheEntry;
pub use index::{AddStats, FileIndex, LoadStats};
pub use sink::{DiagnosticSink, LogSink};

/// Errors surfaced by [`FileIndex`] operations.
///
/// Per-file hashing failures are not represented here; they are logged and
/// the file is skipped.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The directory passed to `add_directory` does not exist.
    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    /// The file passed to `add_file` does not exist.
    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    /// The cache file passed to `load` does not exist.
    #[error("Cache file not found: {0}")]
    CacheNotFound(PathBuf),

    /// The cache file was written with a different format version.
    #[error("Cache file {path} has version {found}, expected {expected}")]
    VersionMismatch {
        /// Cache file path
        path: PathBuf,
        /// Version this build reads and writes
        expected: String,
        /// Version found in the file
        found: String,
    },

    /// The cache file content is truncated or malformed.
    #[error("Invalid cache data in {path}: {source}")]
    Corrupt {
        /// Cache file path
        path: PathBuf,
        /// What was wrong with the data
        #[source]
        source: CodecError,
    },

    /// An I/O error occurred while reading or writing a cache file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl IndexError {
    /// Attach a cache file path to a codec error.
    pub(crate) fn from_codec(path: PathBuf, error: CodecError) -> Self {
        match error {
            CodecError::VersionMismatch { expected, found } => Self::VersionMismatch {
                path,
                expected,
                found,
            },
            CodecError::Io(source) => Self::Io { path, source },
            other => Self::Corrupt {
                path,
                source: other,
            },
        }
    }
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
