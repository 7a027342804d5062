//! CSV report writer.
//!
//! The report is written as consecutive sections separated by a blank
//! record, so it opens cleanly in a spreadsheet:
//!
//! 1. run metadata (`generated_at`, `root`, `dry_run`)
//! 2. summary counts, one `name,value` pair per row
//! 3. actions: `kind,source,destination,outcome,error`
//! 4. duplicate groups: `group_id,hash,size,path,keeper`, one row per file
//! 5. errors: one message per row

use std::io::Write;

use serde::Serialize;

use super::{Report, ReportError, ReportWriter};

/// A single row in the actions section.
#[derive(Debug, Serialize)]
struct ActionRow<'a> {
    kind: String,
    source: &'a str,
    destination: &'a str,
    outcome: String,
    error: &'a str,
}

/// A single row in the duplicate groups section.
#[derive(Debug, Serialize)]
struct GroupRow<'a> {
    group_id: usize,
    hash: &'a str,
    size: u64,
    path: &'a str,
    keeper: bool,
}

/// Sectioned CSV report writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReport;

impl CsvReport {
    /// Create a new CSV report writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReportWriter for CsvReport {
    fn write_report(&self, report: &Report, out: &mut dyn Write) -> Result<(), ReportError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(out);

        csv_writer.write_record(["generated_at", report.generated_at.as_str()])?;
        csv_writer.write_record(["root", report.root.as_str()])?;
        csv_writer.write_record(["dry_run", if report.dry_run { "true" } else { "false" }])?;
        csv_writer.write_record([""])?;

        let summary = &report.summary;
        for (name, value) in [
            ("files_scanned", summary.files_scanned),
            ("files_organized", summary.files_organized),
            ("duplicate_groups", summary.duplicate_groups),
            ("files_removed", summary.files_removed),
            ("errors", summary.errors),
        ] {
            csv_writer.write_record([name, value.to_string().as_str()])?;
        }
        csv_writer.write_record([""])?;

        csv_writer.write_record(["kind", "source", "destination", "outcome", "error"])?;
        for action in &report.actions {
            csv_writer.serialize(ActionRow {
                kind: action.kind.to_string(),
                source: &action.source,
                destination: action.destination.as_deref().unwrap_or(""),
                outcome: action.outcome.to_string(),
                error: action.error.as_deref().unwrap_or(""),
            })?;
        }
        csv_writer.write_record([""])?;

        csv_writer.write_record(["group_id", "hash", "size", "path", "keeper"])?;
        for (idx, group) in report.duplicate_groups.iter().enumerate() {
            for path in &group.files {
                csv_writer.serialize(GroupRow {
                    group_id: idx + 1,
                    hash: &group.hash,
                    size: group.size,
                    path,
                    keeper: *path == group.keeper,
                })?;
            }
        }
        csv_writer.write_record([""])?;

        csv_writer.write_record(["error"])?;
        for error in &report.errors {
            csv_writer.write_record([error.as_str()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
