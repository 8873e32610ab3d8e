//! `dupecache find <FILE> [DIRECTORY] [--cache FILE]`

use anyhow::{bail, Result};

use super::{found_or_not, require_cache_file, resolve_directory, CommandContext};
use crate::cli::FindArgs;
use crate::error::ExitCode;
use crate::output::Table;

/// Show every indexed file with the same content as `args.file`.
///
/// # Errors
///
/// Fails if the file, directory or cache does not exist, or indexing is
/// interrupted.
pub fn run(args: &FindArgs, ctx: &CommandContext) -> Result<ExitCode> {
    if !args.file.is_file() {
        bail!("File {} does not exist.", args.file.display());
    }
    let directory = resolve_directory(args.directory.as_deref())?;
    if let Some(cache) = &args.cache {
        require_cache_file(cache)?;
    }

    let mut index = ctx.new_index();
    ctx.load_or_index(&mut index, args.cache.as_deref(), &directory)?;
    ctx.status(&format!("{} files parsed.", index.count()));

    let Some(matches) = index.find_duplicates(&args.file) else {
        ctx.notice("No duplicate files found.");
        return Ok(found_or_not(false));
    };

    ctx.status("Duplicate files found.");
    print!(
        "{}",
        Table::files(&matches, &directory)
            .with_color(ctx.color)
            .render()
    );
    Ok(found_or_not(true))
}
