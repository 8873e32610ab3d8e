use clap::Parser;
use dupecache::cache::FileIndex;
use dupecache::cli::Cli;
use dupecache::error::ExitCode;
use dupecache::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use super::fixtures::{assets, write};

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupecache", "-q", "--no-progress", "--no-color"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_build_writes_loadable_cache() {
    let dir = assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");

    let code = run(&["build", s(dir.path()), s(&cache)]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let mut index = FileIndex::new();
    index.load(&cache, true, false).unwrap();
    assert_eq!(index.count(), 7);
}

#[test]
fn test_build_missing_directory_fails() {
    let out = tempdir().unwrap();
    let cache = out.path().join("x.cache");

    let err = run(&["build", s(&out.path().join("missing")), s(&cache)]).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    assert!(!cache.exists());
}

#[test]
fn test_duplicates_by_indexing() {
    let dir = assets();
    let code = run(&["duplicates", s(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_duplicates_from_cache_with_csv() {
    let dir = assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    let csv = out.path().join("duplicates.csv");

    run(&["build", s(dir.path()), s(&cache)]).unwrap();
    let code = run(&[
        "duplicates",
        s(dir.path()),
        "--cache",
        s(&cache),
        "--csv",
        s(&csv),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    let content = fs::read_to_string(&csv).unwrap();
    assert!(content.starts_with("Folder,File\n\n"));
    assert_eq!(content.lines().filter(|l| l.is_empty()).count(), 2);
    assert!(content.contains("four.txt"));
    assert!(!content.contains("three.txt"));
}

#[test]
fn test_duplicates_none_found_exit_code() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"alpha");
    write(dir.path(), "b.txt", b"beta");

    let code = run(&["duplicates", s(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_duplicates_missing_cache_fails_before_work() {
    let dir = assets();
    let err = run(&[
        "duplicates",
        s(dir.path()),
        "-c",
        s(&dir.path().join("nope.cache")),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("Cache file"));
}

#[test]
fn test_find_existing_and_missing_matches() {
    let dir = assets();

    let code = run(&["find", s(&dir.path().join("one.txt")), s(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let other = tempdir().unwrap();
    let query = write(other.path(), "query.bin", b"nothing like it");
    let code = run(&["find", s(&query), s(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_find_missing_file_fails() {
    let dir = assets();
    let err = run(&["find", s(&dir.path().join("Not a file")), s(dir.path())]).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_report_merges_caches() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write(first.path(), "report.pdf", b"quarterly numbers");
    write(first.path(), "notes.txt", b"first only");
    write(second.path(), "report copy.pdf", b"quarterly numbers");

    let out = tempdir().unwrap();
    let first_cache = out.path().join("first.cache");
    let second_cache = out.path().join("second.cache");
    run(&["build", s(first.path()), s(&first_cache)]).unwrap();
    run(&["build", s(second.path()), s(&second_cache)]).unwrap();

    // Each cache alone has no duplicates.
    let code = run(&["report", "-c", s(&first_cache)]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    let csv = out.path().join("report.csv");
    let code = run(&[
        "report",
        "-c",
        s(&first_cache),
        "-c",
        s(&second_cache),
        "-o",
        s(&csv),
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let content = fs::read_to_string(&csv).unwrap();
    assert!(content.contains("report.pdf"));
    assert!(content.contains("report copy.pdf"));
    assert!(!content.contains("notes.txt"));
}

#[test]
fn test_report_distinct_csv() {
    let dir = assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    let csv = out.path().join("distinct.csv");
    run(&["build", s(dir.path()), s(&cache)]).unwrap();

    let code = run(&["report", "-c", s(&cache), "--distinct", "-o", s(&csv)]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let content = fs::read_to_string(&csv).unwrap();
    let rows: Vec<&str> = content.lines().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], "Folder,File");
    assert!(rows[1].ends_with(",three.txt"));
    assert!(rows[2].ends_with(",two.png"));
}

#[test]
fn test_report_missing_cache_fails() {
    let out = tempdir().unwrap();
    let err = run(&["report", "-c", s(&out.path().join("missing.cache"))]).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = assets();
    let err = run(&[
        "--config",
        s(&dir.path().join("missing.toml")),
        "duplicates",
        s(dir.path()),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("Configuration file"));
}

#[test]
fn test_invalid_explicit_config_file_fails() {
    let dir = assets();
    let out = tempdir().unwrap();
    let config = write(out.path(), "config.toml", b"show_progress = \"often\"\n");

    let err = run(&["--config", s(&config), "duplicates", s(dir.path())]).unwrap_err();
    assert!(err.to_string().contains("Invalid configuration file"));
}

#[test]
fn test_explicit_config_file_is_used() {
    let dir = assets();
    let out = tempdir().unwrap();
    let config = write(out.path(), "config.toml", b"show_progress = false\n");

    let code = run(&["--config", s(&config), "duplicates", s(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::Success);
}
