//! Command-line interface definitions for dupesort.
//!
//! This module defines all CLI arguments and options using the clap derive
//! API. There are no subcommands: the flags pick which stages run.
//!
//! # Example
//!
//! ```bash
//! # Preview organizing ~/Downloads into per-extension folders
//! dupesort ~/Downloads --organize --move --dry-run
//!
//! # Find duplicates and remove all but the newest copy
//! dupesort ~/Downloads --remove-duplicates --keep latest --report out.csv
//!
//! # Verbose mode for debugging
//! dupesort -v ~/Downloads --duplicates
//! ```

use clap::{ArgAction, Parser};
use std::num::{IntErrorKind, ParseIntError};
use std::path::PathBuf;

use crate::actions::TransferMode;
use crate::duplicates::KeepPolicy;
use crate::scanner::{HashAlgorithm, MAX_CHUNK_SIZE};

/// Organize files by extension and remove byte-identical duplicates.
///
/// Without --report, the run report is printed to stdout as JSON.
#[derive(Debug, Parser)]
#[command(name = "dupesort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to operate on
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Organize files into per-extension folders
    #[arg(long)]
    pub organize: bool,

    /// Move files when organizing
    #[arg(long = "move", conflicts_with = "copy")]
    pub move_files: bool,

    /// Copy files when organizing (default)
    #[arg(long)]
    pub copy: bool,

    /// Directory that receives the extension folders (default: ROOT)
    #[arg(long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Detect duplicate groups
    #[arg(long)]
    pub duplicates: bool,

    /// Remove every duplicate except the keeper (implies --duplicates)
    #[arg(long)]
    pub remove_duplicates: bool,

    /// Which member of a duplicate group to keep
    #[arg(long, value_enum, value_name = "POLICY")]
    pub keep: Option<KeepPolicy>,

    /// Use permanent deletion instead of moving to trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Plan every action without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Write the report to PATH (.csv for CSV, anything else for JSON)
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Directory names to skip (replaces the defaults; repeat or comma-separate)
    #[arg(long = "ignore", value_name = "NAME", value_delimiter = ',', action = ArgAction::Append)]
    pub ignore_dirs: Vec<String>,

    /// Gitignore-style patterns to skip (can be specified multiple times)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude_patterns: Vec<String>,

    /// Only process the root's direct children
    #[arg(long)]
    pub no_recursive: bool,

    /// Content digest for duplicate detection
    #[arg(long = "hash", value_enum, value_name = "ALGORITHM")]
    pub hash_algorithm: Option<HashAlgorithm>,

    /// Read buffer size for hashing (e.g., 64KiB, 1MB; at most 64MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<usize>,

    /// Configuration file (default: platform config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Whether duplicate detection runs.
    #[must_use]
    pub fn wants_duplicates(&self) -> bool {
        self.duplicates || self.remove_duplicates
    }

    /// Transfer mode selected by flags, if any.
    #[must_use]
    pub fn transfer_mode(&self) -> Option<TransferMode> {
        if self.move_files {
            Some(TransferMode::Move)
        } else if self.copy {
            Some(TransferMode::Copy)
        } else {
            None
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupesort::cli::parse_size;
///
/// assert_eq!(parse_size("4096").unwrap(), 4096);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix. Values that overflow
/// `u64` or do not come out to a whole number of bytes are rejected.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    let invalid = || format!("Invalid number: '{num_str}'");
    let too_large = || format!("Size too large: '{s}'");

    let (whole_str, frac_str) = num_str.split_once('.').unwrap_or((num_str, ""));
    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(invalid());
    }
    if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str.parse().map_err(|e: ParseIntError| match e.kind() {
            IntErrorKind::PosOverflow => too_large(),
            _ => invalid(),
        })?
    };
    let whole_bytes = whole.checked_mul(multiplier).ok_or_else(too_large)?;

    let frac_bytes = if frac_str.trim_end_matches('0').is_empty() {
        0
    } else {
        let digits = frac_str.trim_end_matches('0');
        let scale = u32::try_from(digits.len())
            .ok()
            .and_then(|n| 10u128.checked_pow(n))
            .ok_or_else(invalid)?;
        let numerator: u128 = digits.parse().map_err(|_| invalid())?;
        let scaled = numerator
            .checked_mul(u128::from(multiplier))
            .ok_or_else(invalid)?;
        if scaled % scale != 0 {
            return Err(format!("Size is not a whole number of bytes: '{s}'"));
        }
        u64::try_from(scaled / scale).map_err(|_| too_large())?
    };

    whole_bytes.checked_add(frac_bytes).ok_or_else(too_large)
}

/// Parse a hashing chunk size, capped at [`MAX_CHUNK_SIZE`].
///
/// # Errors
///
/// Returns an error for anything [`parse_size`] rejects, and for sizes
/// above 64 MiB.
pub fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    match usize::try_from(bytes) {
        Ok(size) if size <= MAX_CHUNK_SIZE => Ok(size),
        _ => Err(format!(
            "Chunk size {} exceeds the maximum of {}",
            bytesize::ByteSize(bytes),
            bytesize::ByteSize(MAX_CHUNK_SIZE as u64)
        )),
    }
}
