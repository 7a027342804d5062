//! Shared helpers for the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use dupesort::cli::Cli;
use dupesort::error::ExitCode;

/// Run the application quietly with `args` (program name is added).
pub fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupesort", "-q"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("valid arguments");
    dupesort::run_app(cli)
}

/// Run on `root`, writing the JSON or CSV report to `report`.
pub fn run_in(root: &Path, args: &[&str], report: &Path) -> anyhow::Result<ExitCode> {
    let root = root.to_str().unwrap();
    let report = report.to_str().unwrap();
    let mut argv = vec![root, "--report", report];
    argv.extend_from_slice(args);
    run(&argv)
}

/// Write `content` to `root/rel`, creating parent folders.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Parse a JSON report.
pub fn read_report(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Actions of a report with the given outcome.
pub fn actions_with_outcome<'a>(
    report: &'a serde_json::Value,
    outcome: &str,
) -> Vec<&'a serde_json::Value> {
    report["actions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["outcome"] == outcome)
        .collect()
}

/// Every file under `root`, relative and sorted.
pub fn tree(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
