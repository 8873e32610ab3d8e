//! `dupecache duplicates [DIRECTORY] [--cache FILE] [--csv FILE] [--trash]`

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{found_or_not, require_cache_file, resolve_directory, CommandContext};
use crate::cli::DuplicatesArgs;
use crate::error::ExitCode;
use crate::output::{CsvOutput, Table};

/// List every duplicate group, optionally exporting and trashing them.
///
/// # Errors
///
/// Fails on invalid arguments, an unreadable cache, interruption, or a
/// failed CSV export. Individual trash failures are logged, not returned.
pub fn run(args: &DuplicatesArgs, ctx: &CommandContext) -> Result<ExitCode> {
    let directory = resolve_directory(args.directory.as_deref())?;
    if let Some(cache) = &args.cache {
        require_cache_file(cache)?;
    }

    let mut index = ctx.new_index();
    ctx.load_or_index(&mut index, args.cache.as_deref(), &directory)?;
    ctx.status(&format!("{} files parsed.", index.count()));

    let groups = index.find_all_duplicates();
    if groups.is_empty() {
        ctx.notice("No duplicate files found.");
        return Ok(found_or_not(false));
    }

    ctx.reference_folder(&directory);
    print!(
        "{}",
        Table::duplicates(&groups, &directory)
            .with_color(ctx.color)
            .render()
    );
    ctx.status(&format!(
        "{} files found with at least one duplicate.",
        groups.len()
    ));

    if let Some(csv) = &args.csv {
        CsvOutput::duplicates(&groups)
            .write_file(csv)
            .with_context(|| format!("Failed to write {}", csv.display()))?;
        ctx.status(&format!("Report saved to {}.", csv.display()));
    }

    if args.trash {
        let (moved, failed) = trash_extra_copies(&groups);
        ctx.status(&format!("{moved} duplicate files moved to the trash."));
        if failed > 0 {
            log::warn!("{failed} files could not be moved to the trash");
        }
    }

    Ok(found_or_not(true))
}

/// Files `--trash` removes: everything but the first path of each group.
#[must_use]
pub fn extra_copies(groups: &[Vec<PathBuf>]) -> Vec<&PathBuf> {
    groups.iter().flat_map(|group| group.iter().skip(1)).collect()
}

/// Move every extra copy to the trash. Returns (moved, failed).
fn trash_extra_copies(groups: &[Vec<PathBuf>]) -> (usize, usize) {
    let mut moved = 0;
    let mut failed = 0;
    for path in extra_copies(groups) {
        match trash::delete(path) {
            Ok(()) => {
                log::debug!("Moved {} to the trash", path.display());
                moved += 1;
            }
            Err(e) => {
                log::error!("Cannot move {} to the trash: {}", path.display(), e);
                failed += 1;
            }
        }
    }
    (moved, failed)
}
