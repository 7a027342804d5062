//! JSON report writer.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "root": "/data",
//!   "dry_run": true,
//!   "summary": {
//!     "files_scanned": 3,
//!     "files_organized": 1,
//!     "duplicate_groups": 1,
//!     "files_removed": 1,
//!     "errors": 0
//!   },
//!   "actions": [
//!     {"kind": "delete", "source": "/data/b.txt", "destination": null,
//!      "outcome": "simulated", "error": null}
//!   ],
//!   "duplicate_groups": [
//!     {"hash": "abc123...", "size": 5, "keeper": "/data/a.txt",
//!      "files": ["/data/a.txt", "/data/b.txt"]}
//!   ],
//!   "errors": []
//! }
//! ```

use std::io::Write;

use super::{Report, ReportError, ReportWriter};

/// Pretty-printed JSON report writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

impl JsonReport {
    /// Create a writer producing indented JSON.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReportWriter for JsonReport {
    fn write_report(&self, report: &Report, out: &mut dyn Write) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        Ok(())
    }
}
