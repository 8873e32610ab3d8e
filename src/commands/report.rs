//! `dupecache report --cache FILE... [--output CSV] [--distinct]`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use super::{found_or_not, require_cache_file, CommandContext};
use crate::cli::ReportArgs;
use crate::error::ExitCode;
use crate::output::{CsvOutput, Table};

/// Merge several caches and report duplicates or distinct files.
///
/// Caches are loaded as-is (no existence check) and appended, so files
/// present in more than one cache show up as duplicates of each other.
///
/// # Errors
///
/// Fails if no cache is given, any cache is missing or unreadable, or the
/// CSV export fails.
pub fn run(args: &ReportArgs, ctx: &CommandContext) -> Result<ExitCode> {
    if args.caches.is_empty() {
        bail!("Provide at least one cache file to load.");
    }
    for cache in &args.caches {
        require_cache_file(cache)?;
    }

    let mut index = ctx.new_index();
    for cache in &args.caches {
        ctx.load_cache(&mut index, cache, false, true)?;
    }
    ctx.status(&format!("{} files parsed.", index.count()));

    let reference = std::env::current_dir().context("Failed to determine current directory")?;
    ctx.reference_folder(&reference);

    if args.distinct {
        let distincts = index.find_all_distincts();
        report_distincts(&distincts, &reference, args.output.as_deref(), ctx)?;
        Ok(ExitCode::Success)
    } else {
        let groups = index.find_all_duplicates();
        report_duplicates(&groups, &reference, args.output.as_deref(), ctx)?;
        Ok(found_or_not(!groups.is_empty()))
    }
}

fn report_duplicates(
    groups: &[Vec<PathBuf>],
    reference: &Path,
    output: Option<&Path>,
    ctx: &CommandContext,
) -> Result<()> {
    if groups.is_empty() {
        ctx.notice("No duplicate files found.");
        return Ok(());
    }

    ctx.status(&format!(
        "{} files found with at least one duplicate.",
        groups.len()
    ));
    print!(
        "{}",
        Table::duplicates(groups, reference)
            .with_color(ctx.color)
            .render()
    );

    if let Some(output) = output {
        CsvOutput::duplicates(groups)
            .write_file(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        ctx.status(&format!("Report saved to {}.", output.display()));
    }
    Ok(())
}

fn report_distincts(
    distincts: &[PathBuf],
    reference: &Path,
    output: Option<&Path>,
    ctx: &CommandContext,
) -> Result<()> {
    if distincts.is_empty() {
        ctx.notice("No distinct files found.");
        return Ok(());
    }

    ctx.status(&format!("{} distinct files found.", distincts.len()));
    print!(
        "{}",
        Table::files(distincts, reference)
            .with_color(ctx.color)
            .render()
    );

    if let Some(output) = output {
        CsvOutput::files(distincts)
            .write_file(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        ctx.status(&format!("Report saved to {}.", output.display()));
    }
    Ok(())
}
