//! Duplicate grouping, keeper selection and size-based pre-filtering.
//!
//! # Overview
//!
//! Files are referred to by their position in traversal order (the index
//! into the scanned record list). Buckets and groups always keep members in
//! ascending index order, which is what makes [`KeepPolicy::First`]
//! deterministic.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot be duplicates, so only buckets of two
//! or more same-size, non-empty files need to be hashed.
//!
//! # Example
//!
//! ```
//! use dupesort::scanner::FileRecord;
//! use dupesort::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048, SystemTime::now()),
//! ];
//!
//! let (buckets, stats) = group_by_size(&files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(buckets, vec![vec![0, 1]]);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// Which member of a duplicate group is retained.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Keep the member seen first in traversal order.
    #[default]
    #[serde(alias = "keep-first")]
    #[value(alias = "keep-first")]
    First,
    /// Keep the most recently modified member (ties go to traversal order).
    #[serde(alias = "keep-latest")]
    #[value(alias = "keep-latest")]
    Latest,
}

impl std::fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "keep-first"),
            Self::Latest => write!(f, "keep-latest"),
        }
    }
}

/// Pick the keeper index within `files` according to `policy`.
///
/// `files` must be in traversal order. Returns 0 for an empty slice.
#[must_use]
pub fn select_keeper(files: &[FileRecord], policy: KeepPolicy) -> usize {
    match policy {
        KeepPolicy::First => 0,
        KeepPolicy::Latest => {
            let mut best = 0;
            for (idx, file) in files.iter().enumerate().skip(1) {
                // Strictly greater: on equal timestamps the earlier member wins.
                if file.modified > files[best].modified {
                    best = idx;
                }
            }
            best
        }
    }
}

/// Confirmed group of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content hash shared by every member
    pub hash: Hash,
    /// File size in bytes (shared by every member)
    pub size: u64,
    /// Members in traversal order
    pub files: Vec<FileRecord>,
    /// Index into `files` of the retained member
    keeper: usize,
}

impl DuplicateGroup {
    /// Create a group and select its keeper.
    ///
    /// # Arguments
    ///
    /// * `hash` - Content hash
    /// * `files` - Members in traversal order
    /// * `policy` - Keeper selection policy
    #[must_use]
    pub fn new(hash: Hash, files: Vec<FileRecord>, policy: KeepPolicy) -> Self {
        let size = files.first().map_or(0, |f| f.size);
        let keeper = select_keeper(&files, policy);
        Self {
            hash,
            size,
            files,
            keeper,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The retained member.
    ///
    /// # Panics
    ///
    /// Panics if the group is empty, which [`find`](super::DuplicateFinder::find)
    /// never produces.
    #[must_use]
    pub fn keeper(&self) -> &FileRecord {
        &self.files[self.keeper]
    }

    /// Members marked for removal (every member except the keeper).
    pub fn duplicates(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.files
            .iter()
            .enumerate()
            .filter(move |(idx, _)| *idx != self.keeper)
            .map(|(_, file)| file)
    }

    /// Number of duplicate copies (total - 1 keeper).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space held by the duplicates.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Paths of all members.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the size grouping step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of empty files seen
    pub empty_files: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Bucket files by size.
///
/// Returns index buckets (indices into `files`) holding two or more files
/// of the same size, empty files included. Buckets are ordered by their first member and
/// each bucket is in ascending index order.
#[must_use]
pub fn group_by_size(files: &[FileRecord]) -> (Vec<Vec<usize>>, GroupingStats) {
    let mut by_size: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for (idx, file) in files.iter().enumerate() {
        stats.total_files += 1;
        stats.total_size += file.size;

        if file.size == 0 {
            stats.empty_files += 1;
        }

        by_size.entry(file.size).or_default().push(idx);
    }

    if stats.empty_files > 0 {
        log::debug!("{} empty file(s) share one size bucket", stats.empty_files);
    }

    stats.unique_sizes = by_size.len();

    let mut buckets: Vec<Vec<usize>> = by_size
        .into_iter()
        .filter_map(|(size, indices)| {
            if indices.len() < 2 {
                stats.eliminated_unique += 1;
                log::trace!(
                    "Eliminated unique size {}: {}",
                    size,
                    files[indices[0]].path.display()
                );
                None
            } else {
                stats.potential_duplicates += indices.len();
                Some(indices)
            }
        })
        .collect();

    buckets.sort_by_key(|bucket| bucket[0]);

    log::debug!(
        "Size grouping: {} files, {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (buckets, stats)
}
