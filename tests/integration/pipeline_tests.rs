//! End-to-end runs through `run_app`.

use std::fs;

use dupesort::error::ExitCode;
use tempfile::TempDir;

use super::common::{actions_with_outcome, read_report, run, run_in, tree, write_file};

#[test]
fn test_identical_files_form_one_group() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    write_file(root.path(), "a.txt", b"same bytes");
    write_file(root.path(), "b.txt", b"same bytes");
    write_file(root.path(), "c.jpg", b"other data");

    let code = run_in(root.path(), &["--duplicates"], &report_path).unwrap();
    assert_eq!(code, ExitCode::Success);

    let report = read_report(&report_path);
    assert_eq!(report["summary"]["files_scanned"], 3);
    assert_eq!(report["summary"]["duplicate_groups"], 1);

    let files: Vec<String> = report["duplicate_groups"][0]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap().to_string())
        .collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.txt"));
    assert!(files[1].ends_with("b.txt"));
    assert!(report["duplicate_groups"][0]["keeper"]
        .as_str()
        .unwrap()
        .ends_with("a.txt"));

    // detection alone changes nothing
    assert!(report["actions"].as_array().unwrap().is_empty());
    assert_eq!(tree(root.path()), vec!["a.txt", "b.txt", "c.jpg"]);
}

#[test]
fn test_remove_duplicates_dry_run_leaves_files() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    write_file(root.path(), "a.txt", b"dup");
    write_file(root.path(), "b.txt", b"dup");

    run_in(root.path(), &["--remove-duplicates", "--dry-run"], &report_path).unwrap();

    let report = read_report(&report_path);
    assert_eq!(report["dry_run"], true);
    let simulated = actions_with_outcome(&report, "simulated");
    assert_eq!(simulated.len(), 1);
    assert_eq!(simulated[0]["kind"], "delete");
    assert!(simulated[0]["source"].as_str().unwrap().ends_with("b.txt"));
    assert_eq!(report["summary"]["files_removed"], 1);
    assert_eq!(tree(root.path()), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_remove_duplicates_permanent() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    write_file(root.path(), "a.txt", b"dup");
    write_file(root.path(), "sub/b.txt", b"dup");
    write_file(root.path(), "sub/c.txt", b"dup");
    write_file(root.path(), "unique.txt", b"one of a kind");

    run_in(root.path(), &["--remove-duplicates", "--permanent"], &report_path).unwrap();

    let report = read_report(&report_path);
    assert_eq!(actions_with_outcome(&report, "applied").len(), 2);
    assert_eq!(tree(root.path()), vec!["a.txt", "unique.txt"]);
}

#[test]
fn test_keep_latest_keeps_newest_file() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    let old = write_file(root.path(), "a_old.txt", b"dup");
    let new = write_file(root.path(), "b_new.txt", b"dup");
    filetime::set_file_mtime(&old, filetime::FileTime::from_unix_time(1_000_000, 0)).unwrap();
    filetime::set_file_mtime(&new, filetime::FileTime::from_unix_time(2_000_000, 0)).unwrap();

    run_in(
        root.path(),
        &["--remove-duplicates", "--keep", "latest", "--permanent"],
        &report_path,
    )
    .unwrap();

    assert_eq!(tree(root.path()), vec!["b_new.txt"]);
}

#[test]
fn test_missing_root_is_path_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    let report_path = dir.path().join("report.json");

    let err = run_in(&missing, &["--organize", "--move"], &report_path).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::PathNotFound);
    assert_ne!(ExitCode::for_error(&err).as_i32(), 0);
    assert!(!missing.exists());
    assert!(!report_path.exists());
}

#[test]
fn test_root_that_is_a_file() {
    let dir = TempDir::new().unwrap();
    let file = write_file(dir.path(), "plain.txt", b"x");

    let err = run(&[file.to_str().unwrap(), "--duplicates"]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::PathNotFound);
}

#[test]
fn test_removed_duplicates_are_not_organized() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    write_file(root.path(), "a.txt", b"dup");
    write_file(root.path(), "b.txt", b"dup");
    write_file(root.path(), "c.jpg", b"picture");

    run_in(
        root.path(),
        &["--remove-duplicates", "--permanent", "--organize", "--move"],
        &report_path,
    )
    .unwrap();

    assert_eq!(tree(root.path()), vec!["jpg/c.jpg", "txt/a.txt"]);

    let report = read_report(&report_path);
    assert_eq!(report["summary"]["files_removed"], 1);
    assert_eq!(report["summary"]["files_organized"], 2);
    assert_eq!(report["summary"]["errors"], 0);
}

#[test]
fn test_dry_run_matches_real_run() {
    let make_tree = |root: &std::path::Path| {
        write_file(root, "a.txt", b"dup");
        write_file(root, "b.txt", b"dup");
        write_file(root, "notes.txt", b"first notes");
        write_file(root, "sub/notes.txt", b"same name, other content");
        write_file(root, "IMG.JPG", b"JPEG!");
        write_file(root, "Makefile", b"all:");
        write_file(root, "photo.jpg", b"jpeg");
        write_file(root, "node_modules/pkg/index.js", b"ignored");
    };

    let dry = TempDir::new().unwrap();
    let real = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    make_tree(dry.path());
    make_tree(real.path());
    let before = tree(dry.path());

    let args = ["--remove-duplicates", "--permanent", "--organize", "--move"];
    let dry_report = out.path().join("dry.json");
    let real_report = out.path().join("real.json");

    let mut dry_args = args.to_vec();
    dry_args.push("--dry-run");
    run_in(dry.path(), &dry_args, &dry_report).unwrap();
    run_in(real.path(), &args, &real_report).unwrap();

    // no mutation in the dry run
    assert_eq!(tree(dry.path()), before);

    let dry_json = read_report(&dry_report);
    let real_json = read_report(&real_report);
    let dry_actions = dry_json["actions"].as_array().unwrap();
    let real_actions = real_json["actions"].as_array().unwrap();
    assert_eq!(dry_actions.len(), real_actions.len());
    assert_eq!(
        actions_with_outcome(&dry_json, "simulated").len(),
        actions_with_outcome(&real_json, "applied").len()
    );

    // destinations planned identically, relative to each root
    let relative = |json: &serde_json::Value, root: &std::path::Path| -> Vec<Option<String>> {
        let root = fs::canonicalize(root).unwrap();
        json["actions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| {
                a["destination"].as_str().map(|d| {
                    std::path::Path::new(d)
                        .strip_prefix(&root)
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/")
                })
            })
            .collect()
    };
    assert_eq!(relative(&dry_json, dry.path()), relative(&real_json, real.path()));

    assert_eq!(
        tree(real.path()),
        vec![
            "jpg/IMG.JPG",
            "jpg/photo.jpg",
            "no_ext/Makefile",
            "node_modules/pkg/index.js",
            "txt/a.txt",
            "txt/notes.txt",
            "txt/notes_1.txt",
        ]
    );
}
