//! Configuration files feeding full runs.

use std::fs;

use clap::Parser;
use dupesort::cli::Cli;
use dupesort::error::ExitCode;
use tempfile::TempDir;

use super::common::{run, run_in, tree, write_file};

#[test]
fn test_config_file_sets_defaults() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config_path = out.path().join("config.toml");
    fs::write(
        &config_path,
        "transfer_mode = \"move\"\nignore_dirs = []\nkeep = \"latest\"\npermanent = true\n",
    )
    .unwrap();

    let old = write_file(root.path(), "a_old.txt", b"dup");
    let new = write_file(root.path(), "node_modules/b_new.txt", b"dup");
    filetime::set_file_mtime(&old, filetime::FileTime::from_unix_time(1_000, 0)).unwrap();
    filetime::set_file_mtime(&new, filetime::FileTime::from_unix_time(2_000, 0)).unwrap();

    run_in(
        root.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "--remove-duplicates",
            "--organize",
        ],
        &out.path().join("report.json"),
    )
    .unwrap();

    assert_eq!(tree(root.path()), vec!["txt/b_new.txt"]);
}

#[test]
fn test_cli_flag_beats_config_file() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config_path = out.path().join("config.toml");
    fs::write(&config_path, "transfer_mode = \"move\"\n").unwrap();

    write_file(root.path(), "a.txt", b"alpha");

    run_in(
        root.path(),
        &["--config", config_path.to_str().unwrap(), "--organize", "--copy"],
        &out.path().join("report.json"),
    )
    .unwrap();

    assert_eq!(tree(root.path()), vec!["a.txt", "txt/a.txt"]);
}

#[test]
fn test_missing_config_file_is_general_error() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("absent.toml");

    let err = run(&[
        root.path().to_str().unwrap(),
        "--config",
        missing.to_str().unwrap(),
    ])
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_invalid_config_value_is_general_error() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("config.toml");
    fs::write(&config_path, "hash_algorithm = \"md5\"\n").unwrap();

    let err = run(&[
        root.path().to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
    ])
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_oversized_chunk_size_rejected() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("config.toml");
    fs::write(&config_path, "chunk_size = 1073741824\n").unwrap();

    let err = run(&[
        root.path().to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
        "--duplicates",
    ])
    .unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);

    let cli = Cli::try_parse_from([
        "dupesort",
        root.path().to_str().unwrap(),
        "--chunk-size",
        "99999999999999999999GB",
        "--duplicates",
    ]);
    assert!(cli.is_err());
}

#[test]
fn test_sha256_config_groups_duplicates() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config_path = out.path().join("config.toml");
    let report_path = out.path().join("report.json");
    fs::write(&config_path, "hash_algorithm = \"sha256\"\nchunk_size = 1024\n").unwrap();

    write_file(root.path(), "a.bin", &[7u8; 5000]);
    write_file(root.path(), "b.bin", &[7u8; 5000]);

    run_in(
        root.path(),
        &["--config", config_path.to_str().unwrap(), "--duplicates"],
        &report_path,
    )
    .unwrap();

    let report = super::common::read_report(&report_path);
    let hash = report["duplicate_groups"][0]["hash"].as_str().unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(report["duplicate_groups"][0]["size"], 5000);
}
