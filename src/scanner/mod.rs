//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sequential depth-first directory walking using walkdir
//! - Pruning of ignored directory names before descent
//! - Streaming content hashing (BLAKE3 or SHA-256)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Chunked file hashing
//!
//! # Example
//!
//! ```no_run
//! use dupesort::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{} [{}]: {} bytes", file.path.display(), file.extension, file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{hash_to_hex, Hash, HashAlgorithm, Hasher, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use walker::Walker;

/// Folder name used for files without an extension.
pub const NO_EXTENSION: &str = "no_ext";

/// Directory names pruned from every walk unless overridden.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[".git", "Library", "node_modules"];

/// Metadata for a discovered file.
///
/// Created once per file during a walk and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Lower-cased extension without the leading dot, or [`NO_EXTENSION`]
    pub extension: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a new record, deriving the extension from the path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let extension = extension_folder(&path);
        Self {
            path,
            extension,
            size,
            modified,
        }
    }
}

/// Compute the extension folder name for a path.
///
/// The extension is lower-cased and has no leading dot. Paths without an
/// extension (including dotfiles such as `.bashrc`) map to [`NO_EXTENSION`].
///
/// # Example
///
/// ```
/// use dupesort::scanner::extension_folder;
/// use std::path::Path;
///
/// assert_eq!(extension_folder(Path::new("/a/Photo.JPG")), "jpg");
/// assert_eq!(extension_folder(Path::new("/a/Makefile")), "no_ext");
/// ```
#[must_use]
pub fn extension_folder(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}

/// Configuration for directory walking.
///
/// Controls which directories are pruned and how deep the walk goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Directory names that are never descended into.
    pub ignore_dirs: Vec<String>,

    /// Glob patterns to skip (gitignore-style), applied to files and directories.
    pub exclude_patterns: Vec<String>,

    /// Descend into subdirectories. When false only the root's direct
    /// children are yielded.
    pub recursive: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| (*s).to_string()).collect(),
            exclude_patterns: Vec::new(),
            recursive: true,
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `ignore_dirs` - Directory names to prune
    /// * `exclude_patterns` - Glob patterns to skip
    /// * `recursive` - Whether to descend into subdirectories
    #[must_use]
    pub fn new(ignore_dirs: Vec<String>, exclude_patterns: Vec<String>, recursive: bool) -> Self {
        Self {
            ignore_dirs,
            exclude_patterns,
            recursive,
        }
    }

    /// Check whether a directory name is in the ignore set.
    #[must_use]
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.iter().any(|ignored| ignored == name)
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::NotADirectory(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
