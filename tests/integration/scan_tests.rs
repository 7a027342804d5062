//! Walker and finder over realistic trees.

use dupesort::duplicates::{DuplicateFinder, KeepPolicy};
use dupesort::scanner::{Hasher, Walker, WalkerConfig, NO_EXTENSION};
use tempfile::TempDir;

use super::common::write_file;

fn scan(root: &std::path::Path, config: WalkerConfig) -> Vec<dupesort::scanner::FileRecord> {
    Walker::new(root, config)
        .walk()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_default_ignores_and_extensions() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), ".git/HEAD", b"ref");
    write_file(root.path(), "Library/cache.db", b"db");
    write_file(root.path(), "docs/Guide.MD", b"guide");
    write_file(root.path(), "LICENSE", b"mit");
    write_file(root.path(), "archive.tar.gz", b"gz");

    let files = scan(root.path(), WalkerConfig::default());
    let names: Vec<String> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["LICENSE", "archive.tar.gz", "Guide.MD"]);
    assert_eq!(files[0].extension, NO_EXTENSION);
    assert_eq!(files[1].extension, "gz");
    assert_eq!(files[2].extension, "md");
}

#[test]
fn test_scan_is_restartable_and_stable() {
    let root = TempDir::new().unwrap();
    for name in ["c.txt", "a.txt", "sub/b.txt", "sub/a.txt"] {
        write_file(root.path(), name, name.as_bytes());
    }

    let walker = Walker::new(root.path(), WalkerConfig::default());
    let first: Vec<_> = walker.walk().map(|r| r.unwrap().path).collect();
    let second: Vec<_> = walker.walk().map(|r| r.unwrap().path).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_different_content_never_grouped() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "a", b"0123456789");
    write_file(root.path(), "b", b"0123456789");
    write_file(root.path(), "c", b"0123456780");
    write_file(root.path(), "d", b"");
    write_file(root.path(), "e", b"");

    let files = scan(root.path(), WalkerConfig::default());
    let outcome = DuplicateFinder::new(Hasher::new(), KeepPolicy::First).find(&files);

    assert_eq!(outcome.groups.len(), 2);
    assert_eq!(outcome.groups[0].len(), 2);
    assert!(outcome.groups[0].files[0].path.ends_with("a"));
    assert!(outcome.groups[0].files[1].path.ends_with("b"));
    assert!(outcome.groups[1].files[0].path.ends_with("d"));
    assert!(outcome.groups[1].files[1].path.ends_with("e"));
    assert!(!outcome.groups.iter().flat_map(|g| &g.files).any(|f| f.path.ends_with("c")));
}
