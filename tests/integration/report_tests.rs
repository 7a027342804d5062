//! Report files written by full runs.

use std::fs;

use dupesort::error::ExitCode;
use tempfile::TempDir;

use super::common::{read_report, run_in, tree, write_file};

#[test]
fn test_csv_report() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.csv");

    write_file(root.path(), "a.txt", b"dup");
    write_file(root.path(), "b.txt", b"dup");

    run_in(root.path(), &["--remove-duplicates", "--dry-run"], &report_path).unwrap();

    let rows: Vec<Vec<String>> = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&report_path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();

    assert_eq!(rows[0][0], "generated_at");
    assert!(rows.contains(&vec!["dry_run".to_string(), "true".to_string()]));
    assert!(rows.contains(&vec!["duplicate_groups".to_string(), "1".to_string()]));

    let delete_row = rows.iter().find(|r| r[0] == "delete").unwrap();
    assert!(delete_row[1].ends_with("b.txt"));
    assert_eq!(delete_row[3], "simulated");
}

#[test]
fn test_unknown_suffix_writes_json() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.log");

    write_file(root.path(), "a.txt", b"alpha");
    run_in(root.path(), &["--duplicates"], &report_path).unwrap();

    let report = read_report(&report_path);
    assert_eq!(report["summary"]["files_scanned"], 1);
    assert!(report["generated_at"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_unwritable_report_keeps_performed_actions() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("no/such/dir/report.json");

    write_file(root.path(), "a.txt", b"alpha");

    let err = run_in(root.path(), &["--organize", "--move"], &report_path).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::ReportWriteError);
    assert_eq!(ExitCode::for_error(&err).as_i32(), 3);
    // performed operations are not rolled back
    assert_eq!(tree(root.path()), vec!["txt/a.txt"]);
}

#[test]
fn test_unreadable_file_is_reported_not_fatal() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    write_file(root.path(), "a.txt", b"dup");
    write_file(root.path(), "b.txt", b"dup");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let locked = write_file(root.path(), "c.txt", b"dup");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&locked).is_ok() {
            // running as root: permissions are not enforced
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
            return;
        }
    }

    let code = run_in(root.path(), &["--duplicates"], &report_path).unwrap();
    assert_eq!(code, ExitCode::Success);

    let report = read_report(&report_path);
    assert_eq!(report["summary"]["duplicate_groups"], 1);
    #[cfg(unix)]
    {
        assert_eq!(report["summary"]["errors"], 1);
        assert_eq!(report["errors"].as_array().unwrap().len(), 1);
    }
}
