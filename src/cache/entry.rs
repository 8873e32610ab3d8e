//! Cache entry definitions.

use std::path::PathBuf;

use crate::scanner::Fingerprint;

/// One fingerprint and the paths recorded under it, as stored on disk.
///
/// Entries are decoded in file order before any of them is applied to an
/// index, which is what makes loading all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Content fingerprint shared by every path in the entry
    pub fingerprint: Fingerprint,
    /// Absolute paths, after any verification pruning
    pub paths: Vec<PathBuf>,
}

impl CacheEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, paths: Vec<PathBuf>) -> Self {
        Self { fingerprint, paths }
    }

    /// Whether verification removed every path of this entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
