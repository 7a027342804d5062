//! dupesort - File Organizer & Duplicate Remover
//!
//! A Rust CLI application that sorts files into per-extension folders and
//! finds (and optionally removes) byte-identical duplicates using content
//! hashing (BLAKE3 or SHA-256), with dry-run support and JSON/CSV reports.
//!
//! A run is strictly sequential: one scan, then duplicate detection and
//! removal, then organizing of the files that remain, then the report.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::collections::HashSet;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use yansi::Paint;

use crate::actions::{ActionKind, DuplicateRemover, OrganizeConfig, Organizer, RemoveConfig};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::{AppError, ExitCode};
use crate::output::{write_report_file, JsonReport, Report, ReportError, ReportWriter};
use crate::progress::{Progress, ProgressCallback, PHASE_WALKING};
use crate::scanner::{FileRecord, ScanError, Walker};

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an [`AppError`] (wrapped in `anyhow`) when the root is invalid or
/// the report cannot be written, and a plain `anyhow` error for invalid
/// configuration. Per-file failures are recorded in the report instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let root = resolve_root(&cli.root)?;
    let target_dir = match cli.target_dir {
        Some(ref dir) => resolve_target(dir)?,
        None => root.clone(),
    };

    if config.dry_run {
        log::info!("Dry run: no files will be changed");
    }

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(cli.quiet));
    let mut report = Report::new(&root, config.dry_run);

    let walker = Walker::new(&root, config.walker_config());
    let files = scan(&walker, progress.as_ref(), &mut report);

    let hasher = config.hasher();
    let mut removed: HashSet<PathBuf> = HashSet::new();

    if cli.wants_duplicates() {
        let found = DuplicateFinder::new(hasher.clone(), config.keep)
            .with_progress_callback(Arc::clone(&progress))
            .find(&files);
        for err in &found.errors {
            report.add_error(err.to_string());
        }
        report.add_groups(&found.groups);

        if cli.remove_duplicates {
            let remove_config = RemoveConfig::default()
                .with_dry_run(config.dry_run)
                .with_permanent(config.permanent);
            let removal = DuplicateRemover::new(remove_config)
                .with_progress_callback(Arc::clone(&progress))
                .remove(&found.groups);

            removed.extend(
                removal
                    .actions
                    .iter()
                    .filter(|a| a.kind == ActionKind::Delete && a.is_effective())
                    .map(|a| a.source.clone()),
            );
            report.add_actions(&removal.actions);
        }
    }

    if cli.organize {
        let remaining: Vec<FileRecord> = files
            .into_iter()
            .filter(|f| !removed.contains(&f.path))
            .collect();
        let organize_config = OrganizeConfig::new(target_dir, config.transfer_mode, config.dry_run);
        let actions = Organizer::new(organize_config, hasher)
            .with_progress_callback(Arc::clone(&progress))
            .organize(&remaining);
        report.add_actions(&actions);
    }

    match cli.report {
        Some(ref path) => {
            write_report_file(&report, path).map_err(AppError::ReportWrite)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            JsonReport::new()
                .write_report(&report, &mut out)
                .and_then(|()| out.flush().map_err(ReportError::from))
                .map_err(AppError::ReportWrite)?;
        }
    }

    if !cli.quiet {
        eprint!("{}", format_summary(&report, cli.report.as_deref()));
    }

    Ok(ExitCode::Success)
}

/// Make the root absolute and check that it is a directory.
fn resolve_root(root: &Path) -> Result<PathBuf> {
    let absolute = match std::fs::canonicalize(root) {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::PathNotFound(root.to_path_buf()).into());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("cannot resolve root directory {}", root.display())));
        }
    };

    match Walker::new(&absolute, Default::default()).validate_root() {
        Ok(()) => Ok(absolute),
        Err(ScanError::NotFound(path)) => Err(AppError::PathNotFound(path).into()),
        Err(ScanError::NotADirectory(path)) => Err(AppError::NotADirectory(path).into()),
        Err(other) => Err(anyhow::Error::new(other).context("cannot read root directory")),
    }
}

/// Resolve the target directory the same way the root is resolved.
///
/// The target may not exist yet: its nearest existing ancestor is
/// canonicalized and the missing tail appended.
fn resolve_target(dir: &Path) -> Result<PathBuf> {
    let invalid = || format!("invalid target directory: {}", dir.display());
    let absolute = std::path::absolute(dir).with_context(invalid)?;

    let mut existing = absolute.as_path();
    let mut tail: Vec<Component<'_>> = Vec::new();
    loop {
        match std::fs::canonicalize(existing) {
            Ok(mut resolved) => {
                for component in tail.iter().rev() {
                    match component {
                        Component::ParentDir => {
                            resolved.pop();
                        }
                        Component::CurDir => {}
                        other => resolved.push(other.as_os_str()),
                    }
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match (existing.parent(), existing.components().next_back()) {
                    (Some(parent), Some(last)) => {
                        tail.push(last);
                        existing = parent;
                    }
                    _ => return Err(anyhow::Error::new(e).context(invalid())),
                }
            }
            Err(e) => return Err(anyhow::Error::new(e).context(invalid())),
        }
    }
}

/// Collect every record the walker yields; scan errors go to the report.
fn scan(walker: &Walker, progress: &dyn ProgressCallback, report: &mut Report) -> Vec<FileRecord> {
    progress.on_phase_start(PHASE_WALKING, 0);

    let mut files = Vec::new();
    for item in walker.walk() {
        match item {
            Ok(record) => {
                progress.on_progress(files.len() + 1, &record.path.to_string_lossy());
                files.push(record);
            }
            Err(e) => {
                log::warn!("{}", e);
                report.add_error(e.to_string());
            }
        }
    }

    progress.on_phase_end(PHASE_WALKING);
    log::info!("Scanned {} file(s) under {}", files.len(), walker.root().display());

    report.set_files_scanned(files.len());
    files
}

/// Human-readable end-of-run summary.
fn format_summary(report: &Report, report_path: Option<&Path>) -> String {
    let summary = &report.summary;
    let mut text = String::new();

    let title = if report.dry_run {
        "Dry run complete".yellow().bold().to_string()
    } else {
        "Done".green().bold().to_string()
    };
    text.push_str(&format!("{title}\n"));
    text.push_str(&format!("  files scanned:    {}\n", summary.files_scanned));
    text.push_str(&format!("  files organized:  {}\n", summary.files_organized));
    text.push_str(&format!("  duplicate groups: {}\n", summary.duplicate_groups));
    text.push_str(&format!("  files removed:    {}\n", summary.files_removed));

    let reclaimable: u64 = report
        .duplicate_groups
        .iter()
        .map(|g| g.size * (g.files.len().saturating_sub(1)) as u64)
        .sum();
    if reclaimable > 0 {
        text.push_str(&format!(
            "  reclaimable:      {}\n",
            bytesize::ByteSize(reclaimable)
        ));
    }

    if summary.errors > 0 {
        text.push_str(&format!(
            "  errors:           {}\n",
            summary.errors.to_string().red().bold()
        ));
    } else {
        text.push_str("  errors:           0\n");
    }

    if let Some(path) = report_path {
        text.push_str(&format!("Report written to {}\n", path.display()));
    }
    text
}
