//! Command-line interface definitions for dupecache.
//!
//! # Example
//!
//! ```bash
//! # Index a directory once and keep the result
//! dupecache build ./Documents documents.cache
//!
//! # List duplicate groups from the saved cache
//! dupecache duplicates ./Documents --cache documents.cache
//!
//! # Which files have the same content as photo.jpg?
//! dupecache find photo.jpg ./Documents
//!
//! # Compare several caches and export the result
//! dupecache report -c documents.cache -c backup.cache -o report.csv
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Duplicate file finder backed by a reusable content-hash cache.
///
/// Files are identified by the SHA-256 of their content. An index of a
/// directory can be saved once and reloaded later, or several saved caches
/// can be merged to compare directories.
#[derive(Debug, Parser)]
#[command(name = "dupecache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Do not draw progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the cache for a directory
    Build(BuildArgs),
    /// Find all duplicate files within a directory and its sub-directories
    Duplicates(DuplicatesArgs),
    /// Find duplicates of a file within a directory and its sub-directories
    Find(FindArgs),
    /// Compare the caches of several directories and report the duplicates
    Report(ReportArgs),
}

/// Options shared by every command that may index a directory.
#[derive(Debug, Args, Clone, Default)]
pub struct IndexArgs {
    /// Follow symbolic links while indexing
    #[arg(long, conflicts_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links (overrides the configuration file)
    #[arg(long)]
    pub no_follow_symlinks: bool,
}

/// Arguments for `build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Directory to build the cache for (default: current directory)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// File to save the cache to (default: <directory name>.cache)
    #[arg(value_name = "FILENAME")]
    pub filename: Option<PathBuf>,

    #[command(flatten)]
    pub index: IndexArgs,
}

/// Arguments for `duplicates`.
#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    /// Directory to search, also the reference for relative paths
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Load this cache instead of indexing the directory
    #[arg(short, long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Also write the duplicate groups to a CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Keep the first file of each group and move the others to the trash
    #[arg(long)]
    pub trash: bool,

    /// Keep cache entries for files that no longer exist
    #[arg(long)]
    pub no_verify: bool,

    #[command(flatten)]
    pub index: IndexArgs,
}

/// Arguments for `find`.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// File to find duplicates for
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory to search (default: current directory)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Load this cache instead of indexing the directory
    #[arg(short, long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Keep cache entries for files that no longer exist
    #[arg(long)]
    pub no_verify: bool,

    #[command(flatten)]
    pub index: IndexArgs,
}

/// Arguments for `report`.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Cache files to load (repeatable)
    #[arg(short, long = "cache", value_name = "FILES", required = true, num_args = 1..)]
    pub caches: Vec<PathBuf>,

    /// CSV file to save the report to
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report files with no duplicate instead
    #[arg(long)]
    pub distinct: bool,
}
