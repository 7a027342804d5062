//! Duplicate removal using the trash crate.
//!
//! # Overview
//!
//! [`DuplicateRemover`] walks each duplicate group and removes every member
//! except the keeper:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (with explicit flag)
//! - Size and mtime re-checked against the scan before deletion
//!
//! # Safety
//!
//! The keeper of a group is never selected, and every selection is checked
//! with [`validate_preserves_copy`] before anything is deleted.
//!
//! # Example
//!
//! ```no_run
//! use dupesort::actions::delete_to_trash;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/duplicate.txt");
//! match delete_to_trash(&path) {
//!     Ok(size) => println!("Moved {} bytes to trash", size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::duplicates::DuplicateGroup;
use crate::progress::{ProgressCallback, PHASE_REMOVING};
use crate::scanner::FileRecord;

use super::{ActionError, ActionKind, ActionResult};

/// Configuration for duplicate removal.
///
/// Size and modification time are always re-checked before a deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveConfig {
    /// Plan only; nothing is deleted.
    pub dry_run: bool,
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
}

impl RemoveConfig {
    /// Config that only records simulated deletions.
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            ..Self::default()
        }
    }

    /// Enable/disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable/disable permanent deletion.
    #[must_use]
    pub fn with_permanent(mut self, permanent: bool) -> Self {
        self.permanent = permanent;
        self
    }
}

/// File metadata snapshot used to detect changes since the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, ActionError> {
        let metadata = fs::metadata(path).map_err(|e| ActionError::from_io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// Snapshot of a file as the scanner saw it.
    #[must_use]
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            size: record.size,
            mtime: Some(record.modified),
        }
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if file was modified, deleted, or can't be accessed.
    pub fn verify(&self) -> Result<(), ActionError> {
        let current = Self::capture(&self.path)?;

        if let (Some(orig), Some(curr)) = (self.mtime, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since scan: {} (mtime changed)",
                    self.path.display()
                );
                return Err(ActionError::Modified(self.path.clone()));
            }
        }

        if self.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(ActionError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// Move a single file to the system trash.
///
/// Returns the size of the removed file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<u64, ActionError> {
    let size = fs::metadata(path)
        .map_err(|e| ActionError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        ActionError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<u64, ActionError> {
    let size = fs::metadata(path)
        .map_err(|e| ActionError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        ActionError::from_io(path, e)
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no member of the group would remain.
///
/// # Example
///
/// ```
/// use dupesort::actions::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/original.txt"), PathBuf::from("/copy.txt")];
///
/// assert!(validate_preserves_copy(&group[1..], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), ActionError> {
    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(ActionError::AllCopiesWouldBeDeleted)
    } else {
        log::debug!(
            "Deletion validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved_count
        );
        Ok(())
    }
}

/// Result of [`DuplicateRemover::remove`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// One delete action per non-keeper member, in group order
    pub actions: Vec<ActionResult>,
    /// Bytes freed (or that a dry run would free)
    pub bytes_freed: u64,
}

impl RemovalOutcome {
    /// Number of deletions performed or simulated.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_effective()).count()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.actions.len() - self.removed_count()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.failed_count() == 0 {
            format!("Removed {} file(s), freed {}", self.removed_count(), freed)
        } else {
            format!(
                "Removed {} file(s), {} failed, freed {}",
                self.removed_count(),
                self.failed_count(),
                freed
            )
        }
    }
}

/// Removes the non-keeper members of duplicate groups.
pub struct DuplicateRemover {
    config: RemoveConfig,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl DuplicateRemover {
    /// Create a new remover.
    #[must_use]
    pub fn new(config: RemoveConfig) -> Self {
        Self {
            config,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Remove every duplicate except each group's keeper.
    ///
    /// Failures are recorded per file and never stop the batch.
    #[must_use]
    pub fn remove(&self, groups: &[DuplicateGroup]) -> RemovalOutcome {
        let mut outcome = RemovalOutcome::default();
        let total: usize = groups.iter().map(DuplicateGroup::duplicate_count).sum();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_REMOVING, total);
        }

        let mut done = 0;
        for group in groups {
            let selected: Vec<PathBuf> = group.duplicates().map(|f| f.path.clone()).collect();
            if let Err(e) = validate_preserves_copy(&selected, &group.paths()) {
                for record in group.duplicates() {
                    outcome
                        .actions
                        .push(ActionResult::failed(ActionKind::Delete, &record.path, None, &e));
                }
                done += selected.len();
                continue;
            }

            for record in group.duplicates() {
                done += 1;
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(done, &record.path.to_string_lossy());
                }

                match self.remove_one(record) {
                    Ok(size) => {
                        outcome.bytes_freed += size;
                        outcome.actions.push(if self.config.dry_run {
                            ActionResult::simulated(ActionKind::Delete, &record.path, None)
                        } else {
                            ActionResult::applied(ActionKind::Delete, &record.path, None)
                        });
                    }
                    Err(e) => {
                        log::warn!("Failed to delete {}: {}", record.path.display(), e);
                        outcome
                            .actions
                            .push(ActionResult::failed(ActionKind::Delete, &record.path, None, &e));
                    }
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_REMOVING);
        }

        log::info!("{}", outcome.summary());
        outcome
    }

    fn remove_one(&self, record: &FileRecord) -> Result<u64, ActionError> {
        FileSnapshot::from_record(record).verify()?;

        if self.config.dry_run {
            log::info!("[dry-run] would delete {}", record.path.display());
            Ok(record.size)
        } else if self.config.permanent {
            permanent_delete(&record.path)
        } else {
            delete_to_trash(&record.path)
        }
    }
}
