use dupecache::cache::{FileIndex, IndexError};
use std::sync::atomic::AtomicBool;
use tempfile::tempdir;

use super::fixtures::{assets, flatten, write, TXT_SHARED};

#[test]
fn test_add_directory_reference_tree() {
    let dir = assets();
    let root = dir.path();

    let mut index = FileIndex::new();
    let stats = index
        .add_directory(root, &AtomicBool::new(false))
        .unwrap();

    assert_eq!(stats.files_added, 7);
    assert!(!stats.interrupted);
    assert_eq!(index.count(), 7);
    assert_eq!(index.len(), 4);

    let groups = index.find_all_duplicates();
    let mut sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    sizes.sort();
    assert_eq!(sizes, vec![2, 3]);

    assert!(groups.contains(&vec![
        root.join("duplicates/three.png"),
        root.join("one.png"),
    ]));
    assert!(groups.contains(&vec![
        root.join("duplicates/two.txt"),
        root.join("four.txt"),
        root.join("one.txt"),
    ]));

    assert_eq!(
        index.find_all_distincts(),
        vec![root.join("three.txt"), root.join("two.png")]
    );
}

#[test]
fn test_add_missing_directory_leaves_index_unchanged() {
    let dir = assets();
    let mut index = FileIndex::new();
    index.add_file(&dir.path().join("one.png")).unwrap();

    let result = index.add_directory(&dir.path().join("Not a directory"), &AtomicBool::new(false));

    assert!(matches!(result, Err(IndexError::DirectoryNotFound(_))));
    assert_eq!(index.count(), 1);
}

#[test]
fn test_add_missing_file_leaves_index_unchanged() {
    let dir = assets();
    let mut index = FileIndex::new();
    index.add_file(&dir.path().join("one.png")).unwrap();

    let result = index.add_file(&dir.path().join("Not a file"));

    assert!(matches!(result, Err(IndexError::FileNotFound(_))));
    assert_eq!(index.count(), 1);
}

#[test]
fn test_add_two_identical_files() {
    let dir = assets();
    let mut index = FileIndex::new();

    index.add_file(&dir.path().join("one.png")).unwrap();
    assert_eq!(index.count(), 1);
    index
        .add_file(&dir.path().join("duplicates/three.png"))
        .unwrap();
    assert_eq!(index.count(), 2);

    let groups = index.find_all_duplicates();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(index.find_all_distincts().is_empty());
}

#[test]
fn test_directory_then_file() {
    let dir = assets();
    let mut index = FileIndex::new();

    index
        .add_directory(&dir.path().join("duplicates"), &AtomicBool::new(false))
        .unwrap();
    assert_eq!(index.count(), 2);

    index.add_file(&dir.path().join("one.png")).unwrap();
    assert_eq!(index.count(), 3);

    let groups = index.find_all_duplicates();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].contains(&dir.path().join("one.png")));
}

#[test]
fn test_find_duplicates_against_subdirectory() {
    let dir = assets();
    let mut index = FileIndex::new();
    index
        .add_directory(&dir.path().join("duplicates"), &AtomicBool::new(false))
        .unwrap();

    let matches = index.find_duplicates(&dir.path().join("one.png")).unwrap();
    assert_eq!(matches, vec![dir.path().join("duplicates/three.png")]);

    assert!(index.find_duplicates(&dir.path().join("three.txt")).is_none());

    let matches = index.find_duplicates(&dir.path().join("one.txt")).unwrap();
    assert_eq!(matches.len(), 1);
}

#[test]
fn test_find_duplicates_includes_query_when_indexed() {
    let dir = assets();
    let mut index = FileIndex::new();
    index
        .add_directory(dir.path(), &AtomicBool::new(false))
        .unwrap();

    let query = dir.path().join("four.txt");
    let matches = index.find_duplicates(&query).unwrap();
    assert_eq!(matches.len(), 3);
    assert!(matches.contains(&query));
}

#[test]
fn test_distincts_and_duplicates_partition_all_paths() {
    let dir = assets();
    let mut index = FileIndex::new();
    index
        .add_directory(dir.path(), &AtomicBool::new(false))
        .unwrap();

    let mut all = flatten(&index.find_all_duplicates());
    let distincts = index.find_all_distincts();
    for path in &distincts {
        assert!(!all.contains(path));
    }
    all.extend(distincts);
    all.sort();

    assert_eq!(all.len(), index.count());
    for path in &all {
        assert!(index.contains(path));
    }
}

#[test]
fn test_adding_directory_twice_does_not_double_count() {
    let dir = assets();
    let mut index = FileIndex::new();
    let flag = AtomicBool::new(false);

    index.add_directory(dir.path(), &flag).unwrap();
    index.add_directory(dir.path(), &flag).unwrap();

    assert_eq!(index.count(), 7);
    assert_eq!(index.find_all_duplicates().len(), 2);
}

#[test]
fn test_dotted_spellings_index_one_path() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("d");
    std::fs::create_dir_all(root.join("sub")).unwrap();
    let file = write(&root, "x.txt", b"only copy");
    let flag = AtomicBool::new(false);

    let mut index = FileIndex::new();
    index.add_directory(&root, &flag).unwrap();
    index.add_directory(&root.join("sub").join(".."), &flag).unwrap();
    index.add_file(&root.join(".").join("x.txt")).unwrap();

    assert_eq!(index.count(), 1);
    assert!(index.find_all_duplicates().is_empty());
    assert_eq!(index.find_all_distincts(), vec![file]);
}

#[test]
fn test_empty_and_nested_directories() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
    write(dir.path(), "a/b/c/deep.txt", TXT_SHARED);
    write(dir.path(), "empty1", b"");
    write(dir.path(), "a/empty2", b"");

    let mut index = FileIndex::new();
    index
        .add_directory(dir.path(), &AtomicBool::new(false))
        .unwrap();

    assert_eq!(index.count(), 3);
    // Empty files share the empty-content fingerprint.
    assert_eq!(
        index.find_all_duplicates(),
        vec![vec![dir.path().join("a/empty2"), dir.path().join("empty1")]]
    );
}

#[test]
fn test_unicode_file_names() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "café/résumé.txt", TXT_SHARED);
    let b = write(dir.path(), "日本語.txt", TXT_SHARED);

    let mut index = FileIndex::new();
    index
        .add_directory(dir.path(), &AtomicBool::new(false))
        .unwrap();

    let groups = index.find_all_duplicates();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].contains(&a));
    assert!(groups[0].contains(&b));
}
