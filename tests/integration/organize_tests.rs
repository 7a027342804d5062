//! Organizer behavior through full runs.

use std::fs;

use tempfile::TempDir;

use super::common::{actions_with_outcome, read_report, run_in, tree, write_file};

#[test]
fn test_copy_is_default_mode() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    let original = write_file(root.path(), "song.mp3", b"audio");
    filetime::set_file_mtime(&original, filetime::FileTime::from_unix_time(1_500_000_000, 0))
        .unwrap();

    run_in(root.path(), &["--organize"], &report_path).unwrap();

    assert_eq!(tree(root.path()), vec!["mp3/song.mp3", "song.mp3"]);
    let copied = fs::metadata(root.path().join("mp3/song.mp3")).unwrap();
    assert_eq!(
        filetime::FileTime::from_last_modification_time(&copied).unix_seconds(),
        1_500_000_000
    );

    let report = read_report(&report_path);
    assert_eq!(report["actions"][0]["kind"], "copy");
    assert_eq!(report["actions"][0]["outcome"], "applied");
}

#[test]
fn test_second_move_run_is_noop() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let first = out.path().join("first.json");
    let second = out.path().join("second.json");

    write_file(root.path(), "a.txt", b"alpha");
    write_file(root.path(), "b.PDF", b"document");
    write_file(root.path(), "README", b"readme");
    write_file(root.path(), "nested/deep/c.txt", b"gamma");

    run_in(root.path(), &["--organize", "--move"], &first).unwrap();
    let after_first = tree(root.path());
    assert_eq!(
        after_first,
        vec!["no_ext/README", "pdf/b.PDF", "txt/a.txt", "txt/c.txt"]
    );
    assert_eq!(read_report(&first)["summary"]["files_organized"], 4);

    run_in(root.path(), &["--organize", "--move"], &second).unwrap();
    assert_eq!(tree(root.path()), after_first);

    let report = read_report(&second);
    assert!(report["actions"].as_array().unwrap().is_empty());
    assert_eq!(report["summary"]["files_organized"], 0);
}

#[test]
fn test_second_move_run_into_dotted_target_is_noop() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let second = out.path().join("second.json");

    write_file(root.path(), "a.txt", b"alpha");
    write_file(root.path(), "sub/b.csv", b"beta");
    let target = root.path().join("sub/../sorted");
    let args = ["--organize", "--move", "--target-dir", target.to_str().unwrap()];

    run_in(root.path(), &args, &out.path().join("first.json")).unwrap();
    assert_eq!(tree(root.path()), vec!["sorted/csv/b.csv", "sorted/txt/a.txt"]);

    run_in(root.path(), &args, &second).unwrap();
    assert_eq!(tree(root.path()), vec!["sorted/csv/b.csv", "sorted/txt/a.txt"]);
    let report = read_report(&second);
    assert!(report["actions"].as_array().unwrap().is_empty());
}

#[test]
fn test_second_copy_run_only_skips() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let second = out.path().join("second.json");

    write_file(root.path(), "a.txt", b"alpha");
    run_in(root.path(), &["--organize", "--copy"], &out.path().join("first.json")).unwrap();
    run_in(root.path(), &["--organize", "--copy"], &second).unwrap();

    assert_eq!(tree(root.path()), vec!["a.txt", "txt/a.txt"]);
    let report = read_report(&second);
    assert_eq!(actions_with_outcome(&report, "skipped").len(), 1);
    assert!(actions_with_outcome(&report, "applied").is_empty());
}

#[test]
fn test_name_collision_gets_suffix() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let report_path = out.path().join("report.json");

    write_file(root.path(), "one/photo.jpg", b"first photo");
    write_file(root.path(), "two/photo.jpg", b"second photo");
    write_file(root.path(), "three/photo.jpg", b"third photo!");

    run_in(root.path(), &["--organize", "--move"], &report_path).unwrap();

    // traversal order: one, three, two
    assert_eq!(
        fs::read(root.path().join("jpg/photo.jpg")).unwrap(),
        b"first photo"
    );
    assert_eq!(
        fs::read(root.path().join("jpg/photo_1.jpg")).unwrap(),
        b"third photo!"
    );
    assert_eq!(
        fs::read(root.path().join("jpg/photo_2.jpg")).unwrap(),
        b"second photo"
    );
}

#[test]
fn test_target_dir_outside_root() {
    let root = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    write_file(root.path(), "a.txt", b"alpha");
    write_file(root.path(), "b.csv", b"x,y");

    run_in(
        root.path(),
        &["--organize", "--move", "--target-dir", target.path().to_str().unwrap()],
        &out.path().join("report.json"),
    )
    .unwrap();

    assert!(tree(root.path()).is_empty());
    assert_eq!(tree(target.path()), vec!["csv/b.csv", "txt/a.txt"]);
}

#[test]
fn test_no_recursive_and_exclude() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    write_file(root.path(), "keep.txt", b"top");
    write_file(root.path(), "scratch.tmp", b"temp");
    write_file(root.path(), "sub/inner.txt", b"inner");

    run_in(
        root.path(),
        &["--organize", "--move", "--no-recursive", "--exclude", "*.tmp"],
        &out.path().join("report.json"),
    )
    .unwrap();

    assert_eq!(
        tree(root.path()),
        vec!["scratch.tmp", "sub/inner.txt", "txt/keep.txt"]
    );
}

#[test]
fn test_ignore_replaces_default_names() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    write_file(root.path(), "build/out.o", b"object");
    write_file(root.path(), "node_modules/x.js", b"js");

    run_in(
        root.path(),
        &["--organize", "--move", "--ignore", "build"],
        &out.path().join("report.json"),
    )
    .unwrap();

    assert_eq!(tree(root.path()), vec!["build/out.o", "js/x.js"]);
}
