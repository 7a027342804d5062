//! Run reports.
//!
//! This module serializes the outcome of a run:
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! The format is picked once from the report path's suffix (see
//! [`ReportFormat::from_path`]); both formats implement [`ReportWriter`].
//!
//! # Example
//!
//! ```no_run
//! use dupesort::output::{write_report_file, Report};
//! use std::path::Path;
//!
//! let mut report = Report::new(Path::new("/data"), true);
//! report.set_files_scanned(42);
//! write_report_file(&report, Path::new("report.csv")).unwrap();
//! ```

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::actions::{ActionKind, ActionResult, Outcome};
use crate::duplicates::DuplicateGroup;

pub use self::csv::CsvReport;
pub use self::json::JsonReport;

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be created or written.
    #[error("cannot write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// I/O error on an already open writer.
    #[error("I/O error: {0}")]
    Write(#[from] io::Error),
}

/// Report serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Pretty-printed JSON document
    Json,
    /// Sectioned CSV
    Csv,
}

impl ReportFormat {
    /// Pick the format from a path suffix.
    ///
    /// `.csv` (any case) selects CSV; everything else, including no suffix,
    /// selects JSON.
    ///
    /// ```
    /// use dupesort::output::ReportFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ReportFormat::from_path(Path::new("out.CSV")), ReportFormat::Csv);
    /// assert_eq!(ReportFormat::from_path(Path::new("out.txt")), ReportFormat::Json);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Self::Csv,
            _ => Self::Json,
        }
    }

    /// The writer for this format.
    #[must_use]
    pub fn writer(self) -> Box<dyn ReportWriter> {
        match self {
            Self::Json => Box::new(JsonReport::new()),
            Self::Csv => Box::new(CsvReport::new()),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Serializes a [`Report`] to a writer.
pub trait ReportWriter {
    /// Write `report` to `out`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if serialization or writing fails.
    fn write_report(&self, report: &Report, out: &mut dyn Write) -> Result<(), ReportError>;
}

/// Counts shown at the top of every report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Files yielded by the scanner
    pub files_scanned: usize,
    /// Move/copy actions applied (or simulated)
    pub files_organized: usize,
    /// Duplicate groups found
    pub duplicate_groups: usize,
    /// Delete actions applied (or simulated)
    pub files_removed: usize,
    /// Per-file errors
    pub errors: usize,
}

/// One action in report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportAction {
    pub kind: ActionKind,
    pub source: String,
    pub destination: Option<String>,
    pub outcome: Outcome,
    pub error: Option<String>,
}

impl From<&ActionResult> for ReportAction {
    fn from(action: &ActionResult) -> Self {
        Self {
            kind: action.kind,
            source: action.source.to_string_lossy().into_owned(),
            destination: action
                .destination
                .as_ref()
                .map(|d| d.to_string_lossy().into_owned()),
            outcome: action.outcome,
            error: action.error.clone(),
        }
    }
}

/// One duplicate group in report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportGroup {
    /// Content hash (hex)
    pub hash: String,
    /// Size of each member in bytes
    pub size: u64,
    /// Retained member
    pub keeper: String,
    /// All members in traversal order
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for ReportGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            keeper: group.keeper().path.to_string_lossy().into_owned(),
            files: group
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Generation time (UTC, RFC 3339)
    pub generated_at: String,
    /// Root directory of the run
    pub root: String,
    /// Whether the run only simulated actions
    pub dry_run: bool,
    pub summary: ReportSummary,
    pub actions: Vec<ReportAction>,
    pub duplicate_groups: Vec<ReportGroup>,
    pub errors: Vec<String>,
}

impl Report {
    /// Create an empty report stamped with the current time.
    #[must_use]
    pub fn new(root: &Path, dry_run: bool) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            root: root.to_string_lossy().into_owned(),
            dry_run,
            summary: ReportSummary::default(),
            actions: Vec::new(),
            duplicate_groups: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record how many files the scanner produced.
    pub fn set_files_scanned(&mut self, count: usize) {
        self.summary.files_scanned = count;
    }

    /// Add duplicate groups.
    pub fn add_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups.extend(groups.iter().map(ReportGroup::from));
        self.summary.duplicate_groups = self.duplicate_groups.len();
    }

    /// Add executed or simulated actions.
    ///
    /// Failed actions are also listed under `errors`.
    pub fn add_actions(&mut self, actions: &[ActionResult]) {
        for action in actions {
            if action.is_effective() {
                match action.kind {
                    ActionKind::Move | ActionKind::Copy => self.summary.files_organized += 1,
                    ActionKind::Delete => self.summary.files_removed += 1,
                }
            }
            if let Some(ref message) = action.error {
                self.add_error(message.clone());
            }
            self.actions.push(ReportAction::from(action));
        }
    }

    /// Add a per-file error message.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.summary.errors = self.errors.len();
    }
}

/// Write `report` to `path`, picking the format from its suffix.
///
/// # Errors
///
/// Returns `ReportError` if the file cannot be created or written.
pub fn write_report_file(report: &Report, path: &Path) -> Result<ReportFormat, ReportError> {
    let format = ReportFormat::from_path(path);
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    format.writer().write_report(report, &mut out)?;
    out.flush().map_err(io_err)?;

    log::info!("Wrote {} report to {}", format, path.display());
    Ok(format)
}
