use dupecache::cache::codec::{CacheWriter, CodecError};
use dupecache::cache::{FileIndex, IndexError, CACHE_VERSION};
use dupecache::scanner::Fingerprint;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use tempfile::tempdir;

use super::fixtures::{assets, write};

fn indexed_assets() -> (tempfile::TempDir, FileIndex) {
    let dir = assets();
    let mut index = FileIndex::new();
    index
        .add_directory(dir.path(), &AtomicBool::new(false))
        .unwrap();
    (dir, index)
}

#[test]
fn test_save_then_load_round_trip() {
    let (dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");

    index.save(&cache).unwrap();
    assert!(cache.exists());

    let mut loaded = FileIndex::new();
    let stats = loaded.load(&cache, false, false).unwrap();

    assert_eq!(stats.entries, 4);
    assert_eq!(stats.paths_loaded, 7);
    assert_eq!(stats.paths_pruned, 0);
    assert_eq!(loaded.count(), index.count());
    assert_eq!(loaded.find_all_duplicates(), index.find_all_duplicates());
    assert_eq!(loaded.find_all_distincts(), index.find_all_distincts());
    drop(dir);
}

#[test]
fn test_save_is_deterministic() {
    let (_dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let first = out.path().join("first.cache");
    let second = out.path().join("second.cache");

    index.save(&first).unwrap();
    index.save(&second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_verify_drops_deleted_file() {
    let (dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    index.save(&cache).unwrap();

    fs::remove_file(dir.path().join("four.txt")).unwrap();

    let mut unverified = FileIndex::new();
    unverified.load(&cache, false, false).unwrap();
    let mut verified = FileIndex::new();
    let stats = verified.load(&cache, true, false).unwrap();

    assert_eq!(stats.paths_pruned, 1);
    assert_eq!(verified.count(), unverified.count() - 1);
    assert!(!verified.contains(&dir.path().join("four.txt")));
    assert!(unverified.contains(&dir.path().join("four.txt")));
}

#[test]
fn test_verify_prunes_lone_copy_completely() {
    let (dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    index.save(&cache).unwrap();

    fs::remove_file(dir.path().join("three.txt")).unwrap();

    let mut loaded = FileIndex::new();
    loaded.load(&cache, true, false).unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.find_all_distincts(), vec![dir.path().join("two.png")]);
}

#[test]
fn test_append_never_decreases_count() {
    let (dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    index.save(&cache).unwrap();

    let other = tempdir().unwrap();
    let extra = write(other.path(), "extra.bin", b"only here");
    let mut target = FileIndex::new();
    target.add_file(&extra).unwrap();
    let before = target.count();

    target.load(&cache, false, true).unwrap();

    assert!(target.count() >= before);
    assert_eq!(target.count(), before + 7);
    assert!(target.contains(&extra));
    drop(dir);
}

#[test]
fn test_load_without_append_replaces() {
    let (_dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    index.save(&cache).unwrap();

    let other = tempdir().unwrap();
    let extra = write(other.path(), "extra.bin", b"only here");
    let mut target = FileIndex::new();
    target.add_file(&extra).unwrap();

    target.load(&cache, false, false).unwrap();

    assert_eq!(target.count(), 7);
    assert!(!target.contains(&extra));
}

#[test]
fn test_loading_empty_cache_without_append_clears_index() {
    let (_dir, mut index) = indexed_assets();
    assert_eq!(index.count(), 7);

    let out = tempdir().unwrap();
    let cache = out.path().join("empty.cache");
    FileIndex::new().save(&cache).unwrap();

    let stats = index.load(&cache, true, false).unwrap();

    assert_eq!(stats.entries, 0);
    assert!(index.is_empty());
    assert_eq!(index.count(), 0);
    assert!(index.find_all_duplicates().is_empty());
    assert!(index.find_all_distincts().is_empty());
}

#[test]
fn test_appending_same_cache_twice_is_stable() {
    let (_dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    index.save(&cache).unwrap();

    let mut target = FileIndex::new();
    target.load(&cache, false, true).unwrap();
    target.load(&cache, false, true).unwrap();

    assert_eq!(target.count(), 7);
    assert_eq!(target.find_all_duplicates(), index.find_all_duplicates());
}

#[test]
fn test_version_mismatch_leaves_index_untouched() {
    let (_dir, mut index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("future.cache");

    let mut writer = CacheWriter::new(Vec::new());
    writer.write_header("2.0", 0).unwrap();
    fs::write(&cache, writer.finish().unwrap()).unwrap();

    let result = index.load(&cache, false, false);

    match result {
        Err(IndexError::VersionMismatch {
            expected, found, ..
        }) => {
            assert_eq!(expected, CACHE_VERSION);
            assert_eq!(found, "2.0");
        }
        other => panic!("Expected VersionMismatch, got {:?}", other),
    }
    assert_eq!(index.count(), 7);
}

#[test]
fn test_truncated_cache_is_corrupt_and_atomic() {
    let (_dir, index) = indexed_assets();
    let out = tempdir().unwrap();
    let cache = out.path().join("assets.cache");
    index.save(&cache).unwrap();

    let bytes = fs::read(&cache).unwrap();
    fs::write(&cache, &bytes[..bytes.len() - 5]).unwrap();

    let mut target = FileIndex::new();
    let other = tempdir().unwrap();
    let extra = write(other.path(), "extra.bin", b"only here");
    target.add_file(&extra).unwrap();

    let result = target.load(&cache, false, false);

    assert!(matches!(
        result,
        Err(IndexError::Corrupt {
            source: CodecError::Truncated,
            ..
        })
    ));
    assert_eq!(target.count(), 1);
    assert!(target.contains(&extra));
}

#[test]
fn test_invalid_fingerprint_is_corrupt() {
    let out = tempdir().unwrap();
    let cache = out.path().join("bad.cache");

    let mut writer = CacheWriter::new(Vec::new());
    writer.write_header(CACHE_VERSION, 1).unwrap();
    writer.write_string("not-a-hash").unwrap();
    writer.write_count(0).unwrap();
    fs::write(&cache, writer.finish().unwrap()).unwrap();

    let mut index = FileIndex::new();
    let result = index.load(&cache, false, false);

    assert!(matches!(
        result,
        Err(IndexError::Corrupt {
            source: CodecError::BadFingerprint(_),
            ..
        })
    ));
}

#[test]
fn test_load_missing_cache() {
    let out = tempdir().unwrap();
    let mut index = FileIndex::new();

    let result = index.load(&out.path().join("missing.cache"), true, false);
    assert!(matches!(result, Err(IndexError::CacheNotFound(_))));
}

#[test]
fn test_load_externally_written_cache() {
    // A cache listing paths that do not exist on this machine.
    let out = tempdir().unwrap();
    let cache = out.path().join("external.cache");
    let key = Fingerprint::of_bytes(b"shared").to_hex();

    let mut writer = CacheWriter::new(Vec::new());
    writer.write_header(CACHE_VERSION, 1).unwrap();
    writer.write_string(&key).unwrap();
    writer.write_count(2).unwrap();
    writer.write_string("/nowhere/a.txt").unwrap();
    writer.write_string("/nowhere/b.txt").unwrap();
    fs::write(&cache, writer.finish().unwrap()).unwrap();

    let mut index = FileIndex::new();
    index.load(&cache, false, false).unwrap();
    assert_eq!(
        index.find_all_duplicates(),
        vec![vec![
            PathBuf::from("/nowhere/a.txt"),
            PathBuf::from("/nowhere/b.txt")
        ]]
    );

    let mut verified = FileIndex::new();
    let stats = verified.load(&cache, true, false).unwrap();
    assert_eq!(stats.paths_pruned, 2);
    assert!(verified.is_empty());
}
