//! In-memory file index keyed by content fingerprint.
//!
//! # Overview
//!
//! [`FileIndex`] maps each [`Fingerprint`] to the set of absolute paths whose
//! content hashes to it. Two invariants hold at all times:
//!
//! - no fingerprint maps to an empty set;
//! - a path appears under at most one fingerprint. Re-inserting a path with
//!   a different fingerprint moves it.
//!
//! Files that cannot be hashed are skipped with a warning; a single
//! unreadable file never aborts a scan.
//!
//! # Example
//!
//! ```no_run
//! use dupecache::cache::{FileIndex, LogSink};
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! let mut index = FileIndex::with_sink(Arc::new(LogSink));
//! let shutdown = AtomicBool::new(false);
//! index.add_directory(Path::new("./Documents"), &shutdown)?;
//!
//! for group in index.find_all_duplicates() {
//!     println!("{} copies: {:?}", group.len(), group);
//! }
//! index.save(Path::new("documents.cache"))?;
//! # Ok::<(), dupecache::cache::IndexError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::Level;
use tempfile::NamedTempFile;

use super::codec::{CacheReader, CacheWriter, CodecError, CodecResult, CACHE_VERSION};
use super::entry::CacheEntry;
use super::sink::DiagnosticSink;
use super::{IndexError, IndexResult};
use crate::progress::ProgressCallback;
use crate::scanner::{absolute_path, hash_file, Fingerprint, Walker, WalkerConfig};

/// Outcome of [`FileIndex::add_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddStats {
    /// Files hashed and inserted
    pub files_added: usize,
    /// Files that could not be hashed and were skipped
    pub files_skipped: usize,
    /// Directory entries the walker could not read
    pub scan_errors: usize,
    /// Whether the scan stopped early on the shutdown flag
    pub interrupted: bool,
}

/// Outcome of [`FileIndex::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Entries read from the cache file
    pub entries: usize,
    /// Paths applied to the index
    pub paths_loaded: usize,
    /// Paths dropped because they no longer exist (verify only)
    pub paths_pruned: usize,
}

/// Mapping from content fingerprint to the paths sharing it.
#[derive(Default)]
pub struct FileIndex {
    entries: HashMap<Fingerprint, HashSet<PathBuf>>,
    locations: HashMap<PathBuf, Fingerprint>,
    walker_config: WalkerConfig,
    sink: Option<Arc<dyn DiagnosticSink>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileIndex")
            .field("fingerprints", &self.entries.len())
            .field("paths", &self.locations.len())
            .field("walker_config", &self.walker_config)
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FileIndex {
    /// Create an empty index that drops its diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index reporting diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::default()
        }
    }

    /// Set the progress callback used by `add_directory` and `load`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the directory walking options used by `add_directory`.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    fn emit(&self, level: Level, message: fmt::Arguments<'_>) {
        if let Some(sink) = &self.sink {
            sink.log(level, &message.to_string());
        }
    }

    fn progress(&self) -> Option<&dyn ProgressCallback> {
        self.progress_callback.as_deref()
    }

    /// Add every regular file under `root`, recursively.
    ///
    /// The shutdown flag is polled before each file; once it is set the scan
    /// stops without error and whatever was indexed so far is kept.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DirectoryNotFound`] if `root` is not an existing
    /// directory. Nothing is modified in that case.
    pub fn add_directory(&mut self, root: &Path, shutdown: &AtomicBool) -> IndexResult<AddStats> {
        if !root.is_dir() {
            self.emit(
                Level::Error,
                format_args!(
                    "Cannot add {} to the cache: directory does not exist",
                    root.display()
                ),
            );
            return Err(IndexError::DirectoryNotFound(root.to_path_buf()));
        }

        let root = absolute(root)?;
        self.emit(
            Level::Debug,
            format_args!("Adding {} to the cache", root.display()),
        );

        let mut stats = AddStats::default();
        if let Some(progress) = self.progress() {
            progress.on_phase_start("indexing", 0);
        }

        let walker = Walker::new(&root, self.walker_config.clone());
        for entry in walker.walk() {
            if shutdown.load(Ordering::SeqCst) {
                self.emit(Level::Debug, format_args!("Indexing cancelled"));
                stats.interrupted = true;
                break;
            }

            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    self.emit(Level::Warn, format_args!("Skipping directory entry: {e}"));
                    stats.scan_errors += 1;
                    continue;
                }
            };

            if self.index_path(&path, Some(root.as_path())) {
                stats.files_added += 1;
                if let Some(progress) = self.progress() {
                    progress.on_progress(stats.files_added, &path.to_string_lossy());
                }
            } else {
                stats.files_skipped += 1;
            }
        }

        if let Some(progress) = self.progress() {
            progress.on_phase_end("indexing");
        }
        Ok(stats)
    }

    /// Add a single file.
    ///
    /// A file that exists but cannot be hashed is skipped silently (a
    /// warning goes to the sink).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::FileNotFound`] if `path` is not an existing
    /// regular file. Nothing is modified in that case.
    pub fn add_file(&mut self, path: &Path) -> IndexResult<()> {
        if !path.is_file() {
            self.emit(
                Level::Error,
                format_args!(
                    "Cannot add {} to the cache: file does not exist",
                    path.display()
                ),
            );
            return Err(IndexError::FileNotFound(path.to_path_buf()));
        }

        let path = absolute(path)?;
        self.emit(
            Level::Debug,
            format_args!("Adding {} to the cache", path.display()),
        );
        self.index_path(&path, None);
        Ok(())
    }

    /// Hash and insert one path. Returns whether it was inserted.
    fn index_path(&mut self, path: &Path, root: Option<&Path>) -> bool {
        if path.to_str().is_none() {
            self.emit(
                Level::Warn,
                format_args!(
                    "Skipping {}: path is not valid UTF-8",
                    path.to_string_lossy()
                ),
            );
            return false;
        }

        let fingerprint = match hash_file(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.emit(Level::Warn, format_args!("Cannot hash file: {e}"));
                return false;
            }
        };

        let shown = root
            .and_then(|r| path.strip_prefix(r).ok())
            .unwrap_or(path);
        self.emit(
            Level::Debug,
            format_args!("Adding {} with key {fingerprint}", shown.display()),
        );
        self.insert(fingerprint, path.to_path_buf());
        true
    }

    /// Record `path` under `fingerprint`, moving it if it was recorded
    /// under another one.
    fn insert(&mut self, fingerprint: Fingerprint, path: PathBuf) {
        if let Some(previous) = self.locations.get(&path).copied() {
            if previous == fingerprint {
                return;
            }
            self.emit(
                Level::Debug,
                format_args!(
                    "Moving {} from key {previous} to {fingerprint}",
                    path.display()
                ),
            );
            if let Some(set) = self.entries.get_mut(&previous) {
                set.remove(&path);
                if set.is_empty() {
                    self.entries.remove(&previous);
                }
            }
        }

        self.entries
            .entry(fingerprint)
            .or_default()
            .insert(path.clone());
        self.locations.insert(path, fingerprint);
    }

    /// Total number of distinct paths in the index.
    #[must_use]
    pub fn count(&self) -> usize {
        debug_assert_eq!(
            self.locations.len(),
            self.entries.values().map(HashSet::len).sum::<usize>()
        );
        self.locations.len()
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` is recorded in the index.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.locations.contains_key(path)
    }

    /// Find every indexed path with the same content as `path`.
    ///
    /// `path` is hashed on the spot and does not need to be indexed. The
    /// result may or may not include `path` itself. Returns `None` when the
    /// file cannot be hashed or no indexed file shares its content.
    #[must_use]
    pub fn find_duplicates(&self, path: &Path) -> Option<Vec<PathBuf>> {
        let fingerprint = match hash_file(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.emit(Level::Warn, format_args!("Cannot hash file: {e}"));
                return None;
            }
        };

        self.entries.get(&fingerprint).map(sorted)
    }

    /// Every group of two or more paths sharing the same content.
    ///
    /// Paths are sorted within a group, and groups by their first path.
    #[must_use]
    pub fn find_all_duplicates(&self) -> Vec<Vec<PathBuf>> {
        let mut groups: Vec<Vec<PathBuf>> = self
            .entries
            .values()
            .filter(|set| set.len() >= 2)
            .map(sorted)
            .collect();
        groups.sort();
        groups
    }

    /// Every path whose content no other indexed path shares, sorted.
    #[must_use]
    pub fn find_all_distincts(&self) -> Vec<PathBuf> {
        let mut distincts: Vec<PathBuf> = self
            .entries
            .values()
            .filter(|set| set.len() == 1)
            .flat_map(|set| set.iter().cloned())
            .collect();
        distincts.sort();
        distincts
    }

    /// Write the whole index to `destination`, replacing any existing file.
    ///
    /// The data goes to a temporary file next to `destination`, which is
    /// renamed over it once fully written. A failed save leaves any previous
    /// file intact.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] on any write or rename failure.
    pub fn save(&self, destination: &Path) -> IndexResult<()> {
        let io_error = |source| IndexError::Io {
            path: destination.to_path_buf(),
            source,
        };

        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(directory).map_err(io_error)?;

        self.encode(BufWriter::new(&mut temp))
            .map_err(|e| IndexError::from_codec(destination.to_path_buf(), e))?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(destination).map_err(|e| io_error(e.error))?;

        self.emit(
            Level::Debug,
            format_args!(
                "Saved {} paths under {} keys to {}",
                self.count(),
                self.len(),
                destination.display()
            ),
        );
        Ok(())
    }

    /// Encode the index in sorted order so identical indexes produce
    /// identical files.
    fn encode<W: Write>(&self, writer: W) -> CodecResult<()> {
        let mut writer = CacheWriter::new(writer);
        writer.write_header(CACHE_VERSION, self.entries.len())?;

        let mut keys: Vec<&Fingerprint> = self.entries.keys().collect();
        keys.sort();
        for key in keys {
            let paths = sorted(&self.entries[key]);
            writer.write_string(&key.to_hex())?;
            writer.write_count(paths.len())?;
            for path in &paths {
                // Non-UTF-8 paths are rejected at insertion.
                writer.write_string(&path.to_string_lossy())?;
            }
        }

        writer.finish()?;
        Ok(())
    }

    /// Load a cache file written by [`save`](Self::save).
    ///
    /// With `verify`, paths that no longer exist are dropped; this prunes
    /// deleted files but never discovers new ones or re-hashes modified
    /// ones. With `append`, entries are merged into the current index;
    /// otherwise the index is replaced.
    ///
    /// The file is decoded completely before anything is applied, so on
    /// error the index is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`IndexError::CacheNotFound`] if `source` does not exist
    /// - [`IndexError::VersionMismatch`] if the version tag differs
    /// - [`IndexError::Corrupt`] if the data is truncated or malformed
    /// - [`IndexError::Io`] on read failure
    pub fn load(&mut self, source: &Path, verify: bool, append: bool) -> IndexResult<LoadStats> {
        if !source.exists() {
            self.emit(
                Level::Error,
                format_args!("Cache file {} not found", source.display()),
            );
            return Err(IndexError::CacheNotFound(source.to_path_buf()));
        }

        let file = File::open(source).map_err(|e| IndexError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

        if let Some(progress) = self.progress() {
            progress.on_phase_start("loading", 0);
        }
        let decoded = self.decode(BufReader::new(file), verify);
        if let Some(progress) = self.progress() {
            progress.on_phase_end("loading");
        }
        let (staged, mut stats) =
            decoded.map_err(|e| IndexError::from_codec(source.to_path_buf(), e))?;

        if !append {
            self.entries.clear();
            self.locations.clear();
        }
        for entry in staged {
            for path in entry.paths {
                self.insert(entry.fingerprint, path);
                stats.paths_loaded += 1;
            }
        }

        self.emit(
            Level::Debug,
            format_args!(
                "Loaded {} paths from {} ({} pruned)",
                stats.paths_loaded,
                source.display(),
                stats.paths_pruned
            ),
        );
        Ok(stats)
    }

    fn decode<R: Read>(&self, reader: R, verify: bool) -> CodecResult<(Vec<CacheEntry>, LoadStats)> {
        let mut reader = CacheReader::new(reader);
        let entry_count = reader.read_header(CACHE_VERSION)?;

        let mut stats = LoadStats::default();
        let mut staged = Vec::with_capacity(entry_count.min(4096));

        for _ in 0..entry_count {
            let key = reader.read_string()?;
            let fingerprint =
                Fingerprint::from_hex(&key).ok_or(CodecError::BadFingerprint(key))?;
            let path_count = reader.read_count()?;

            let mut paths = Vec::with_capacity(path_count.min(1024));
            for _ in 0..path_count {
                let path = PathBuf::from(reader.read_string()?);
                if verify && !path.exists() {
                    self.emit(
                        Level::Debug,
                        format_args!("Dropping {}: file no longer exists", path.display()),
                    );
                    stats.paths_pruned += 1;
                    continue;
                }
                paths.push(path);
            }

            stats.entries += 1;
            if let Some(progress) = self.progress() {
                progress.on_progress(stats.entries, &fingerprint.to_hex());
            }
            let entry = CacheEntry::new(fingerprint, paths);
            if !entry.is_empty() {
                staged.push(entry);
            }
        }

        Ok((staged, stats))
    }
}

fn sorted(set: &HashSet<PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = set.iter().cloned().collect();
    paths.sort();
    paths
}

fn absolute(path: &Path) -> IndexResult<PathBuf> {
    absolute_path(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}
