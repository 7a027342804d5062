//! Duplicate finder: size bucketing followed by full content hashing.
//!
//! # Overview
//!
//! 1. **Size grouping**: bucket records by size (see [`crate::duplicates::groups`])
//! 2. **Full hash**: stream every candidate through the configured digest,
//!    one file at a time, in traversal order
//! 3. **Grouping**: collect indices by hash, drop singletons, select keepers
//!
//! Hashing failures do not abort the run; they are returned alongside the
//! groups so the caller can report them.
//!
//! # Example
//!
//! ```no_run
//! use dupesort::duplicates::{DuplicateFinder, KeepPolicy};
//! use dupesort::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//!
//! let finder = DuplicateFinder::new(Hasher::new(), KeepPolicy::First);
//! let outcome = finder.find(&files);
//! println!("{} duplicate groups", outcome.groups.len());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::progress::{ProgressCallback, PHASE_HASHING};
use crate::scanner::{FileRecord, Hash, HashError, Hasher};

use super::groups::{group_by_size, DuplicateGroup, GroupingStats, KeepPolicy};

/// Statistics from a duplicate search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderStats {
    /// Size grouping statistics
    pub grouping: GroupingStats,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash
    pub failed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding keepers)
    pub duplicate_files: usize,
    /// Total space held by duplicates in bytes
    pub reclaimable_space: u64,
}

/// Result of [`DuplicateFinder::find`].
#[derive(Debug, Default)]
pub struct FindOutcome {
    /// Confirmed groups, ordered by the traversal position of their first member
    pub groups: Vec<DuplicateGroup>,
    /// Search statistics
    pub stats: FinderStats,
    /// Files that could not be hashed
    pub errors: Vec<HashError>,
}

/// Groups byte-identical files.
pub struct DuplicateFinder {
    hasher: Hasher,
    keep: KeepPolicy,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("hasher", &self.hasher)
            .field("keep", &self.keep)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a new finder.
    ///
    /// # Arguments
    ///
    /// * `hasher` - Hasher used for content digests
    /// * `keep` - Keeper selection policy
    #[must_use]
    pub fn new(hasher: Hasher, keep: KeepPolicy) -> Self {
        Self {
            hasher,
            keep,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Find duplicate groups among `files`.
    ///
    /// `files` must be in traversal order; that order decides group order,
    /// member order and the `keep-first` keeper.
    #[must_use]
    pub fn find(&self, files: &[FileRecord]) -> FindOutcome {
        let (buckets, grouping) = group_by_size(files);
        let mut outcome = FindOutcome {
            stats: FinderStats {
                grouping,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut candidates: Vec<usize> = buckets.into_iter().flatten().collect();
        candidates.sort_unstable();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_HASHING, candidates.len());
        }

        let mut by_hash: HashMap<Hash, Vec<usize>> = HashMap::new();
        for (n, &idx) in candidates.iter().enumerate() {
            let file = &files[idx];
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(n + 1, &file.path.to_string_lossy());
            }

            match self.hasher.full_hash(&file.path) {
                Ok(hash) => {
                    outcome.stats.hashed_files += 1;
                    by_hash.entry(hash).or_default().push(idx);
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                    outcome.stats.failed_files += 1;
                    outcome.errors.push(e);
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        let mut grouped: Vec<(Hash, Vec<usize>)> = by_hash
            .into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .collect();
        grouped.sort_by_key(|(_, indices)| indices[0]);

        outcome.groups = grouped
            .into_iter()
            .map(|(hash, indices)| {
                let members = indices.iter().map(|&i| files[i].clone()).collect();
                DuplicateGroup::new(hash, members, self.keep)
            })
            .collect();

        outcome.stats.duplicate_groups = outcome.groups.len();
        outcome.stats.duplicate_files = outcome.groups.iter().map(DuplicateGroup::duplicate_count).sum();
        outcome.stats.reclaimable_space = outcome.groups.iter().map(DuplicateGroup::wasted_space).sum();

        log::info!(
            "Found {} duplicate group(s), {} duplicate file(s), {} reclaimable",
            outcome.stats.duplicate_groups,
            outcome.stats.duplicate_files,
            bytesize::ByteSize(outcome.stats.reclaimable_space)
        );

        outcome
    }
}
