//! Subcommand implementations.
//!
//! Each command validates its arguments before touching the index, then
//! either loads a saved cache or indexes a directory, queries, and prints.

pub mod build;
pub mod duplicates;
pub mod find;
pub mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use yansi::Paint;

use crate::cache::{FileIndex, LogSink};
use crate::config::Config;
use crate::error::ExitCode;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::absolute_path;
use crate::signal::ShutdownHandler;

/// Indexing stopped because Ctrl+C was pressed.
///
/// Commands return this instead of saving or reporting a partial index;
/// `main` maps it to exit code 130.
#[derive(Debug, thiserror::Error)]
#[error("Indexing interrupted by user")]
pub struct Interrupted;

const STATUS_COLOR: (u8, u8, u8) = (70, 130, 180);
const NOTICE_COLOR: (u8, u8, u8) = (215, 175, 0);

/// Everything a command needs besides its own arguments.
pub struct CommandContext {
    /// Merged configuration
    pub config: Config,
    /// Ctrl+C flag polled while indexing
    pub shutdown: ShutdownHandler,
    /// Suppress status lines (results are still printed)
    pub quiet: bool,
    /// Colour tables and status lines
    pub color: bool,
    progress: Arc<Progress>,
}

impl CommandContext {
    /// Create a context.
    #[must_use]
    pub fn new(config: Config, shutdown: ShutdownHandler, quiet: bool, color: bool) -> Self {
        let progress = Arc::new(Progress::new(quiet || !config.show_progress));
        Self {
            config,
            shutdown,
            quiet,
            color,
            progress,
        }
    }

    /// An empty index wired to the log, the progress spinner and the
    /// configured walker options.
    #[must_use]
    pub fn new_index(&self) -> FileIndex {
        FileIndex::with_sink(Arc::new(LogSink))
            .with_progress_callback(self.progress.clone())
            .with_walker_config(self.config.walker_config())
    }

    /// The progress reporter, for phases driven by a command.
    #[must_use]
    pub fn progress(&self) -> &dyn ProgressCallback {
        self.progress.as_ref()
    }

    /// Print a status line unless quiet.
    pub fn status(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.color {
            let (r, g, b) = STATUS_COLOR;
            println!("{}", message.rgb(r, g, b));
        } else {
            println!("{message}");
        }
    }

    /// Print a notice (nothing found and similar) unless quiet.
    pub fn notice(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.color {
            let (r, g, b) = NOTICE_COLOR;
            println!("{}", message.rgb(r, g, b));
        } else {
            println!("{message}");
        }
    }

    /// Print the reference folder paths are shown relative to.
    pub fn reference_folder(&self, directory: &Path) {
        if self.quiet {
            return;
        }
        if self.color {
            println!("Reference folder: {}.", directory.display().dim());
        } else {
            println!("Reference folder: {}.", directory.display());
        }
    }

    /// Index `directory` into `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if Ctrl+C stopped the scan, or the index
    /// error if the directory vanished.
    pub fn index_directory(&self, index: &mut FileIndex, directory: &Path) -> Result<()> {
        let flag = self.shutdown.get_flag();
        let stats = index
            .add_directory(directory, &flag)
            .with_context(|| format!("Failed to index {}", directory.display()))?;

        if stats.interrupted {
            return Err(Interrupted.into());
        }
        if stats.files_skipped > 0 || stats.scan_errors > 0 {
            log::warn!(
                "{} files could not be hashed and {} entries could not be read",
                stats.files_skipped,
                stats.scan_errors
            );
        }
        Ok(())
    }

    /// Load `cache` into `index`.
    ///
    /// # Errors
    ///
    /// Returns the index error with the cache path as context.
    pub fn load_cache(
        &self,
        index: &mut FileIndex,
        cache: &Path,
        verify: bool,
        append: bool,
    ) -> Result<()> {
        let stats = index
            .load(cache, verify, append)
            .with_context(|| format!("Failed to load cache {}", cache.display()))?;
        if stats.paths_pruned > 0 {
            log::info!(
                "{} cached files no longer exist and were dropped",
                stats.paths_pruned
            );
        }
        Ok(())
    }

    /// Fill `index` from `cache` if given, otherwise by indexing `directory`.
    ///
    /// # Errors
    ///
    /// Propagates [`load_cache`](Self::load_cache) and
    /// [`index_directory`](Self::index_directory) errors.
    pub fn load_or_index(
        &self,
        index: &mut FileIndex,
        cache: Option<&Path>,
        directory: &Path,
    ) -> Result<()> {
        match cache {
            Some(cache) => self.load_cache(index, cache, self.config.verify_on_load, false),
            None => self.index_directory(index, directory),
        }
    }
}

/// Resolve an optional directory argument to an absolute, existing directory.
///
/// # Errors
///
/// Fails if the directory does not exist or the current directory cannot
/// be determined.
pub fn resolve_directory(directory: Option<&Path>) -> Result<PathBuf> {
    let directory = match directory {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    if !directory.is_dir() {
        bail!("Directory {} does not exist.", directory.display());
    }
    absolute_path(&directory)
        .with_context(|| format!("Failed to resolve {}", directory.display()))
}

/// Fail unless `cache` is an existing file.
///
/// # Errors
///
/// Fails with a message naming the missing file.
pub fn require_cache_file(cache: &Path) -> Result<()> {
    if !cache.is_file() {
        bail!("Cache file {} does not exist.", cache.display());
    }
    Ok(())
}

/// Exit code for a query that may have found nothing.
#[must_use]
pub fn found_or_not(found: bool) -> ExitCode {
    if found {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    }
}
