//! Extension organizer: move or copy files into per-extension folders.
//!
//! # Overview
//!
//! Each file is sent to `<target>/<extension>/<file name>`, where the
//! extension folder is the lower-cased extension or `no_ext`.
//!
//! - Files already inside their extension folder under the target are left
//!   alone and produce no action, so re-running is a no-op.
//! - A name taken by a file with different content gets a numeric suffix
//!   (`photo_1.jpg`, `photo_2.jpg`, ...).
//! - A name taken by identical content yields a skipped action.
//! - Dry runs create no folders and transfer nothing, but reserve planned
//!   destinations so later files are planned exactly as in a real run.
//!
//! # Example
//!
//! ```no_run
//! use dupesort::actions::{OrganizeConfig, Organizer, TransferMode};
//! use dupesort::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let root = Path::new("/home/user/Downloads");
//! let files: Vec<_> = Walker::new(root, WalkerConfig::default())
//!     .walk()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! let config = OrganizeConfig::new(root.to_path_buf(), TransferMode::Move, true);
//! let actions = Organizer::new(config, Hasher::new()).organize(&files);
//! println!("{} planned transfers", actions.len());
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::progress::{ProgressCallback, PHASE_ORGANIZING};
use crate::scanner::{FileRecord, Hasher};

use super::{ActionError, ActionKind, ActionResult};

/// Upper bound on numeric suffixes tried for a free destination name.
const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// How files reach their extension folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Copy, leaving the original in place
    #[default]
    Copy,
    /// Move (rename, or copy + delete across filesystems)
    Move,
}

impl TransferMode {
    /// The action kind recorded for this mode.
    #[must_use]
    pub fn action_kind(self) -> ActionKind {
        match self {
            Self::Copy => ActionKind::Copy,
            Self::Move => ActionKind::Move,
        }
    }
}

/// Configuration for the organizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeConfig {
    /// Directory that holds the extension folders
    pub target_dir: PathBuf,
    /// Move or copy
    pub mode: TransferMode,
    /// Plan only
    pub dry_run: bool,
}

impl OrganizeConfig {
    /// Create a new organizer configuration.
    #[must_use]
    pub fn new(target_dir: PathBuf, mode: TransferMode, dry_run: bool) -> Self {
        Self {
            target_dir,
            mode,
            dry_run,
        }
    }
}

/// Where a file would land.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Placement {
    /// A free name in the extension folder
    Free(PathBuf),
    /// The name already holds identical content
    SameContent(PathBuf),
}

/// Moves or copies files into extension folders.
pub struct Organizer {
    config: OrganizeConfig,
    hasher: Hasher,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl Organizer {
    /// Create a new organizer.
    ///
    /// The hasher is used to recognise destinations that already hold
    /// identical content.
    #[must_use]
    pub fn new(config: OrganizeConfig, hasher: Hasher) -> Self {
        Self {
            config,
            hasher,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The extension folder for a record.
    #[must_use]
    pub fn folder_for(&self, record: &FileRecord) -> PathBuf {
        self.config.target_dir.join(&record.extension)
    }

    /// Check whether a record already lives inside its extension folder.
    #[must_use]
    pub fn is_organized(&self, record: &FileRecord) -> bool {
        let Ok(relative) = record.path.strip_prefix(&self.config.target_dir) else {
            return false;
        };

        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(first)), Some(_)) => {
                first.to_string_lossy().to_lowercase() == record.extension
            }
            _ => false,
        }
    }

    /// Organize `files`, returning one action per file that needed work.
    ///
    /// Failures are recorded and the organizer moves on to the next file.
    #[must_use]
    pub fn organize(&self, files: &[FileRecord]) -> Vec<ActionResult> {
        let kind = self.config.mode.action_kind();
        let mut actions = Vec::new();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();
        // destination -> file currently holding the content that lands there
        let mut reserved: HashMap<PathBuf, PathBuf> = HashMap::new();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_ORGANIZING, files.len());
        }

        for (n, record) in files.iter().enumerate() {
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(n + 1, &record.path.to_string_lossy());
            }

            if self.is_organized(record) {
                log::trace!("Already organized: {}", record.path.display());
                continue;
            }

            let placement = match self.place(record, &reserved) {
                Ok(p) => p,
                Err(e) => {
                    log::warn!("Cannot place {}: {}", record.path.display(), e);
                    actions.push(ActionResult::failed(kind, &record.path, None, &e));
                    continue;
                }
            };

            let dest = match placement {
                Placement::SameContent(dest) => {
                    log::debug!(
                        "Skipping {}: identical file at {}",
                        record.path.display(),
                        dest.display()
                    );
                    actions.push(ActionResult::skipped(kind, &record.path, Some(&dest)));
                    continue;
                }
                Placement::Free(dest) => dest,
            };

            if self.config.dry_run {
                log::info!(
                    "[dry-run] {} {} -> {}",
                    kind,
                    record.path.display(),
                    dest.display()
                );
                reserved.insert(dest.clone(), record.path.clone());
                actions.push(ActionResult::simulated(kind, &record.path, Some(&dest)));
                continue;
            }

            let result = self
                .ensure_folder(&dest, &mut created_dirs)
                .and_then(|()| self.transfer(record, &dest));

            match result {
                Ok(()) => {
                    log::info!("{} {} -> {}", kind, record.path.display(), dest.display());
                    reserved.insert(dest.clone(), dest.clone());
                    actions.push(ActionResult::applied(kind, &record.path, Some(&dest)));
                }
                Err(e) => {
                    log::warn!("Failed to {} {}: {}", kind, record.path.display(), e);
                    actions.push(ActionResult::failed(kind, &record.path, Some(&dest), &e));
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_ORGANIZING);
        }

        actions
    }

    /// Pick the destination for `record`.
    fn place(
        &self,
        record: &FileRecord,
        reserved: &HashMap<PathBuf, PathBuf>,
    ) -> Result<Placement, ActionError> {
        let folder = self.folder_for(record);
        let file_name = record
            .path
            .file_name()
            .ok_or_else(|| ActionError::NotFound(record.path.clone()))?;

        let mut candidate = folder.join(file_name);
        let mut counter = 1;

        loop {
            let occupant = if let Some(source) = reserved.get(&candidate) {
                Some(source.clone())
            } else if candidate.symlink_metadata().is_ok() {
                Some(candidate.clone())
            } else {
                None
            };

            let Some(occupant) = occupant else {
                return Ok(Placement::Free(candidate));
            };

            if self.same_content(&record.path, &occupant)? {
                return Ok(Placement::SameContent(candidate));
            }

            if counter > MAX_RENAME_ATTEMPTS {
                return Err(ActionError::Io {
                    path: record.path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "no free destination name",
                    ),
                });
            }

            candidate = folder.join(suffixed_name(&record.path, counter));
            counter += 1;
        }
    }

    /// Compare two files by size and then content hash.
    fn same_content(&self, a: &Path, b: &Path) -> Result<bool, ActionError> {
        let size_a = fs::metadata(a).map_err(|e| ActionError::from_io(a, e))?.len();
        let Ok(meta_b) = fs::metadata(b) else {
            return Ok(false);
        };
        if !meta_b.is_file() || size_a != meta_b.len() {
            return Ok(false);
        }

        let hash_a = self.hasher.full_hash(a)?;
        Ok(self.hasher.full_hash(b).is_ok_and(|hash_b| hash_a == hash_b))
    }

    /// Create the destination's folder once per run.
    fn ensure_folder(
        &self,
        dest: &Path,
        created_dirs: &mut HashSet<PathBuf>,
    ) -> Result<(), ActionError> {
        let Some(parent) = dest.parent() else {
            return Ok(());
        };
        if created_dirs.contains(parent) {
            return Ok(());
        }

        fs::create_dir_all(parent).map_err(|e| ActionError::from_io(parent, e))?;
        log::debug!("Ensured folder {}", parent.display());
        created_dirs.insert(parent.to_path_buf());
        Ok(())
    }

    /// Perform the move or copy.
    fn transfer(&self, record: &FileRecord, dest: &Path) -> Result<(), ActionError> {
        let source = record.path.as_path();
        match self.config.mode {
            TransferMode::Copy => copy_preserving_mtime(source, dest),
            TransferMode::Move => match fs::rename(source, dest) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                    log::debug!(
                        "{} is on another filesystem, moving by copy + delete",
                        source.display()
                    );
                    move_by_copy(source, dest)
                }
                Err(e) => Err(ActionError::from_io(source, e)),
            },
        }
    }
}

/// `stem_N.ext`, or `stem_N` for files without an extension.
fn suffixed_name(path: &Path, counter: u32) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext.to_string_lossy()),
        None => format!("{}_{}", stem, counter),
    }
}

/// Copy a file and carry over its modification time.
fn copy_preserving_mtime(source: &Path, dest: &Path) -> Result<(), ActionError> {
    fs::copy(source, dest).map_err(|e| ActionError::from_io(source, e))?;

    let modified = fs::metadata(source).and_then(|m| m.modified());
    if let Ok(modified) = modified {
        let result = fs::File::options()
            .write(true)
            .open(dest)
            .and_then(|f| f.set_modified(modified));
        if let Err(e) = result {
            log::debug!("Could not preserve mtime on {}: {}", dest.display(), e);
        }
    }
    Ok(())
}

/// Move across filesystems: copy, verify the size, then remove the source.
fn move_by_copy(source: &Path, dest: &Path) -> Result<(), ActionError> {
    let expected = fs::metadata(source)
        .map_err(|e| ActionError::from_io(source, e))?
        .len();
    copy_preserving_mtime(source, dest)?;

    let actual = fs::metadata(dest)
        .map_err(|e| ActionError::from_io(dest, e))?
        .len();
    if actual != expected {
        let _ = fs::remove_file(dest);
        return Err(ActionError::CopyVerification {
            path: source.to_path_buf(),
            expected,
            actual,
        });
    }

    fs::remove_file(source).map_err(|e| ActionError::from_io(source, e))
}
