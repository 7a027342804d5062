//! File actions module.
//!
//! This module provides the two executors that mutate the filesystem:
//! - [`organize`]: move or copy files into per-extension folders
//! - [`delete`]: remove the non-keeper members of duplicate groups
//!
//! Every attempted operation produces one [`ActionResult`]. In dry-run mode
//! the executors plan exactly as they would for a real run and record
//! [`Outcome::Simulated`] instead of touching the filesystem. Per-file
//! failures are recorded as [`Outcome::Failed`] and never stop the batch.
//!
//! ```no_run
//! use dupesort::actions::{DuplicateRemover, RemoveConfig};
//!
//! let remover = DuplicateRemover::new(RemoveConfig::dry_run());
//! let outcome = remover.remove(&[]);
//! assert!(outcome.actions.is_empty());
//! ```

pub mod delete;
pub mod organize;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::HashError;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, permanent_delete, validate_preserves_copy, DuplicateRemover, FileSnapshot,
    RemoveConfig, RemovalOutcome,
};
pub use organize::{OrganizeConfig, Organizer, TransferMode};

/// Error type for a single file operation.
#[derive(Debug, Error)]
pub enum ActionError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// A cross-device move copied the wrong number of bytes.
    #[error("copy verification failed for {path}: source {expected} bytes, destination {actual} bytes")]
    CopyVerification {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// The file could not be read for a content comparison.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Classify an I/O error raised while operating on `path`.
    pub(crate) fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::TrashFailed { path: p, .. }
            | Self::CopyVerification { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::Hash(e) => Some(e.path()),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }
}

/// Kind of filesystem operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Move a file into its extension folder
    Move,
    /// Copy a file into its extension folder
    Copy,
    /// Delete a duplicate
    Delete,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move => write!(f, "move"),
            Self::Copy => write!(f, "copy"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// What happened to a planned operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The operation was performed
    Applied,
    /// Dry run: the operation would have been performed
    Simulated,
    /// Nothing to do: the destination already holds identical content
    Skipped,
    /// The operation was attempted and failed
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Simulated => write!(f, "simulated"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Record of one planned or performed file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Operation kind
    pub kind: ActionKind,
    /// File operated on
    pub source: PathBuf,
    /// Destination for move/copy, `None` for delete
    pub destination: Option<PathBuf>,
    /// Result of the operation
    pub outcome: Outcome,
    /// Error message when `outcome` is [`Outcome::Failed`]
    pub error: Option<String>,
}

impl ActionResult {
    fn with_outcome(
        kind: ActionKind,
        source: &Path,
        destination: Option<&Path>,
        outcome: Outcome,
    ) -> Self {
        Self {
            kind,
            source: source.to_path_buf(),
            destination: destination.map(Path::to_path_buf),
            outcome,
            error: None,
        }
    }

    /// An operation that was performed.
    #[must_use]
    pub fn applied(kind: ActionKind, source: &Path, destination: Option<&Path>) -> Self {
        Self::with_outcome(kind, source, destination, Outcome::Applied)
    }

    /// An operation that a dry run would have performed.
    #[must_use]
    pub fn simulated(kind: ActionKind, source: &Path, destination: Option<&Path>) -> Self {
        Self::with_outcome(kind, source, destination, Outcome::Simulated)
    }

    /// An operation that was unnecessary.
    #[must_use]
    pub fn skipped(kind: ActionKind, source: &Path, destination: Option<&Path>) -> Self {
        Self::with_outcome(kind, source, destination, Outcome::Skipped)
    }

    /// An operation that failed with `error`.
    #[must_use]
    pub fn failed(
        kind: ActionKind,
        source: &Path,
        destination: Option<&Path>,
        error: &ActionError,
    ) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::with_outcome(kind, source, destination, Outcome::Failed)
        }
    }

    /// Whether the operation changed (or in a dry run, would change) the filesystem.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        matches!(self.outcome, Outcome::Applied | Outcome::Simulated)
    }
}
