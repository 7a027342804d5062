//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based bucketing of candidate files
//! - Full content hashing of candidates
//! - Duplicate group construction and keeper selection

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FindOutcome, FinderStats};
pub use groups::{group_by_size, select_keeper, DuplicateGroup, GroupingStats, KeepPolicy};
