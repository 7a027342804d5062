//! Directory walker implementation using walkdir for depth-first traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and producing [`FileRecord`] values. The walk is single-threaded
//! and lazy: nothing is read until the returned iterator is consumed, and
//! calling [`Walker::walk`] again starts a fresh traversal.
//!
//! # Features
//!
//! - Depth-first traversal, children sorted by file name
//! - Ignored directory names are pruned before descending
//! - Gitignore-style exclude patterns via the `ignore` crate
//! - Optional non-recursive mode (root's direct children only)
//! - Symbolic links are neither followed nor reported
//!
//! # Example
//!
//! ```no_run
//! use dupesort::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     exclude_patterns: vec!["*.tmp".to_string()],
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk (absolute)
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// Relative paths are made absolute against the current directory so
    /// that every yielded record carries an absolute path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupesort::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self { root, config }
    }

    /// The root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] if the root does not exist
    /// - [`ScanError::NotADirectory`] if the root is not a directory
    pub fn validate_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(self.root.clone()))
            }
            Err(e) => Err(self.classify_io_error(&self.root, e)),
        }
    }

    /// Build the exclude matcher from config patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.exclude_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.exclude_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid exclude pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build exclude patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path matches an exclude pattern.
    fn is_excluded(&self, path: &Path, is_dir: bool, gitignore: Option<&Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative_path.to_string_lossy();
        let normalized_path = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched(normalized_path, is_dir).is_ignore()
    }

    /// Decide whether the walk should yield or descend into an entry.
    fn keep_entry(&self, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let is_dir = entry.file_type().is_dir();
        if is_dir {
            let name = entry.file_name().to_string_lossy();
            if self.config.is_ignored_dir(&name) {
                log::trace!("Pruning ignored directory: {}", entry.path().display());
                return false;
            }
        }

        if self.is_excluded(entry.path(), is_dir, gitignore) {
            log::trace!("Excluding: {}", entry.path().display());
            return false;
        }

        true
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Returns a lazy iterator over [`FileRecord`] results. Errors are
    /// yielded as [`ScanError`] values rather than stopping iteration.
    /// The root is not validated here; call [`Walker::validate_root`] first
    /// when a missing root must be fatal.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupesort::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let gitignore = self.build_gitignore();
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .max_depth(max_depth)
            .sort_by_file_name();

        walk_dir
            .into_iter()
            .filter_entry(move |entry| self.keep_entry(entry, gitignore.as_ref()))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.handle_walkdir_error(e))),
            })
    }

    /// Turn a directory entry into a record, or skip it.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileRecord, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walkdir_error(e))),
        };

        // Sockets, FIFOs and devices
        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", entry.path().display());
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Some(Ok(FileRecord::new(
            entry.path().to_path_buf(),
            metadata.len(),
            modified,
        )))
    }

    /// Classify an I/O error for a path.
    fn classify_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle walkdir errors.
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.into_io_error() {
            Some(io_error) => self.classify_io_error(&path, io_error),
            None => {
                log::warn!("Walker error for {}", path.display());
                ScanError::Io {
                    path,
                    source: std::io::Error::other("filesystem loop detected"),
                }
            }
        }
    }
}
