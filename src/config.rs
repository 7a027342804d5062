//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file (`--config <PATH>`, or `config.toml` in the platform
//!    config directory)
//! 3. `DUPESORT_*` environment variables (e.g. `DUPESORT_KEEP=latest`)
//! 4. command-line flags ([`Config::merge_cli`])
//!
//! ```toml
//! ignore_dirs = [".git", "node_modules"]
//! exclude_patterns = ["*.tmp"]
//! recursive = true
//! keep = "latest"
//! transfer_mode = "move"
//! permanent = false
//! dry_run = false
//! hash_algorithm = "sha256"
//! chunk_size = 131072
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::TransferMode;
use crate::cli::Cli;
use crate::duplicates::KeepPolicy;
use crate::scanner::{
    HashAlgorithm, Hasher, WalkerConfig, DEFAULT_CHUNK_SIZE, DEFAULT_IGNORE_DIRS, MAX_CHUNK_SIZE,
};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DUPESORT_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory names pruned from traversal.
    pub ignore_dirs: Vec<String>,
    /// Gitignore-style patterns skipped during traversal.
    pub exclude_patterns: Vec<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Keeper policy for duplicate groups.
    pub keep: KeepPolicy,
    /// How the organizer transfers files.
    pub transfer_mode: TransferMode,
    /// Delete duplicates permanently instead of moving them to trash.
    pub permanent: bool,
    /// Simulate every action.
    pub dry_run: bool,
    /// Content digest.
    pub hash_algorithm: HashAlgorithm,
    /// Read buffer size for hashing, in bytes.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| (*s).to_string()).collect(),
            exclude_patterns: Vec::new(),
            recursive: true,
            keep: KeepPolicy::First,
            transfer_mode: TransferMode::Copy,
            permanent: false,
            dry_run: false,
            hash_algorithm: HashAlgorithm::Blake3,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default platform file
    /// is used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, or if any layer
    /// holds a value of the wrong type or an unknown variant.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                Self::load_from_path(path)
            }
            None => match Self::config_path().filter(|p| p.is_file()) {
                Some(default_path) => Self::load_from_path(&default_path),
                None => Self::extract(Self::base()),
            },
        }
    }

    /// Load defaults, the TOML file at `path` and environment overrides.
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or environment holds invalid values.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {}", path.display());
        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX));
        Self::extract(figment)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config = figment
            .extract::<Self>()
            .context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that deserialize but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` exceeds [`MAX_CHUNK_SIZE`].
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size > MAX_CHUNK_SIZE {
            anyhow::bail!(
                "chunk_size {} exceeds the maximum of {} bytes",
                self.chunk_size,
                MAX_CHUNK_SIZE
            );
        }
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupesort", "dupesort")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line flags on top of the loaded layers.
    ///
    /// Flags only override when given; boolean switches can only turn a
    /// setting on (or, for `--no-recursive`, off).
    pub fn merge_cli(&mut self, cli: &Cli) {
        if !cli.ignore_dirs.is_empty() {
            self.ignore_dirs.clone_from(&cli.ignore_dirs);
        }
        self.exclude_patterns.extend(cli.exclude_patterns.iter().cloned());
        if cli.no_recursive {
            self.recursive = false;
        }
        if let Some(keep) = cli.keep {
            self.keep = keep;
        }
        if let Some(mode) = cli.transfer_mode() {
            self.transfer_mode = mode;
        }
        self.permanent |= cli.permanent;
        self.dry_run |= cli.dry_run;
        if let Some(algorithm) = cli.hash_algorithm {
            self.hash_algorithm = algorithm;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.ignore_dirs.clone(),
            self.exclude_patterns.clone(),
            self.recursive,
        )
    }

    /// Hasher derived from this configuration.
    #[must_use]
    pub fn hasher(&self) -> Hasher {
        Hasher::new()
            .with_algorithm(self.hash_algorithm)
            .with_chunk_size(self.chunk_size)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }
}
