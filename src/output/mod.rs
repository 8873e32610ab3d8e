//! Presentation of query results.
//!
//! - [`table`]: bordered terminal tables, coloured with `yansi`
//! - [`csv`]: `Folder,File` CSV export
//!
//! Both take the absolute paths returned by [`FileIndex`](crate::cache::FileIndex)
//! queries. Tables show them relative to a reference directory; CSV keeps
//! them absolute.

pub mod csv;
pub mod table;

use std::path::{Component, Path, PathBuf};

pub use self::csv::{CsvOutput, CsvOutputError};
pub use table::Table;

/// Express `path` relative to `base`, climbing with `..` where needed.
///
/// Paths on different roots (another drive on Windows) are returned
/// unchanged. A path equal to `base` becomes `.`.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();

    let common = path_components
        .iter()
        .zip(&base_components)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return path.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}

/// Split a path into its folder and file name, both as display strings.
#[must_use]
pub fn folder_and_file(path: &Path) -> (String, String) {
    let folder = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (folder, file)
}
