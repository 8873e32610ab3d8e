//! Application configuration.
//!
//! Settings are merged from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. `DUPECACHE_*` environment variables (`DUPECACHE_VERIFY_ON_LOAD=false`)
//!
//! Command-line flags are applied last with [`Config::merge_cli`].

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands};
use crate::scanner::WalkerConfig;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPECACHE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Drop cache entries for files that no longer exist when loading a
    /// cache for `duplicates` and `find`.
    pub verify_on_load: bool,
    /// Follow symbolic links while indexing.
    pub follow_symlinks: bool,
    /// Draw progress spinners on stderr.
    pub show_progress: bool,
    /// Extension of the default cache file written by `build`.
    pub cache_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verify_on_load: true,
            follow_symlinks: false,
            show_progress: true,
            cache_extension: "cache".to_string(),
        }
    }
}

impl Config {
    /// Load from the default platform path, falling back to defaults.
    #[must_use]
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from_path(path),
            None => Self::load_layers(None),
        }
    }

    /// Load using `path` as the configuration file.
    ///
    /// A missing file is not an error; its layer is simply empty. A file
    /// that fails to parse is logged and defaults are used.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        Self::load_layers(Some(path.as_ref()))
    }

    /// Load using `path` as the configuration file, failing if the merged
    /// layers do not form a valid configuration.
    ///
    /// # Errors
    ///
    /// Returns the figment error naming the offending key and source.
    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Self::figment(Some(path.as_ref())).extract()
    }

    fn load_layers(path: Option<&Path>) -> Self {
        match Self::figment(path).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default configuration file location, if the platform has one.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupecache", "dupecache")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if cli.no_progress {
            self.show_progress = false;
        }

        let index_args = match &cli.command {
            Commands::Build(args) => Some(&args.index),
            Commands::Duplicates(args) => Some(&args.index),
            Commands::Find(args) => Some(&args.index),
            Commands::Report(_) => None,
        };
        if let Some(args) = index_args {
            if args.follow_symlinks {
                self.follow_symlinks = true;
            }
            if args.no_follow_symlinks {
                self.follow_symlinks = false;
            }
        }

        let no_verify = match &cli.command {
            Commands::Duplicates(args) => args.no_verify,
            Commands::Find(args) => args.no_verify,
            _ => false,
        };
        if no_verify {
            self.verify_on_load = false;
        }
    }

    /// Directory walking options derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks)
    }
}
