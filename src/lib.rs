//! dupecache - duplicate file finder with a reusable content-hash cache.
//!
//! Files are fingerprinted with SHA-256 and grouped by fingerprint in a
//! [`cache::FileIndex`], which can be saved to a compact binary cache file
//! and reloaded later, alone or merged with the caches of other
//! directories.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use anyhow::{bail, Context as _, Result};

use crate::cli::{Cli, Commands};
use crate::commands::CommandContext;
use crate::config::Config;
use crate::error::ExitCode;

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns any command failure; [`commands::Interrupted`] when Ctrl+C
/// stopped indexing.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            if !path.is_file() {
                bail!("Configuration file {} does not exist.", path.display());
            }
            Config::try_load_from_path(path).with_context(|| {
                format!("Invalid configuration file {}", path.display())
            })?
        }
        None => Config::load(),
    };
    config.merge_cli(&cli);
    log::debug!("Using configuration: {:?}", config);

    if cli.no_color {
        yansi::disable();
    }

    let shutdown = signal::install_handler()?;
    let ctx = CommandContext::new(config, shutdown, cli.quiet, !cli.no_color);

    match &cli.command {
        Commands::Build(args) => commands::build::run(args, &ctx),
        Commands::Duplicates(args) => commands::duplicates::run(args, &ctx),
        Commands::Find(args) => commands::find::run(args, &ctx),
        Commands::Report(args) => commands::report::run(args, &ctx),
    }
}
