//! `dupecache build [DIRECTORY] [FILENAME]`

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{resolve_directory, CommandContext};
use crate::cli::BuildArgs;
use crate::error::ExitCode;

/// Index a directory and save the cache.
///
/// # Errors
///
/// Fails if the directory does not exist, indexing is interrupted, or the
/// cache cannot be written.
pub fn run(args: &BuildArgs, ctx: &CommandContext) -> Result<ExitCode> {
    let directory = resolve_directory(args.directory.as_deref())?;

    let mut index = ctx.new_index();
    ctx.index_directory(&mut index, &directory)?;
    ctx.status(&format!("{} files added to the cache.", index.count()));

    let filename = args
        .filename
        .clone()
        .unwrap_or_else(|| default_cache_name(&directory, &ctx.config.cache_extension));

    ctx.progress().on_phase_start("saving", 0);
    let saved = index.save(&filename);
    ctx.progress().on_phase_end("saving");
    saved.with_context(|| format!("Failed to save cache to {}", filename.display()))?;

    ctx.status(&format!("Cache saved to {}.", filename.display()));
    Ok(ExitCode::Success)
}

/// `<directory name>.<extension>` in the current directory.
#[must_use]
pub fn default_cache_name(directory: &Path, extension: &str) -> PathBuf {
    let stem = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    PathBuf::from(format!("{stem}.{extension}"))
}
