//! CSV export of duplicate groups and distinct files.
//!
//! The file starts with a `Folder,File` header, then one row per file with
//! its absolute folder and file name. For duplicate groups a blank line
//! precedes each group:
//!
//! ```text
//! Folder,File
//!
//! /data/a,report.pdf
//! /data/b,report.pdf
//!
//! /data/a,photo.jpg
//! /data/c,photo (1).jpg
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::folder_and_file;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow {
    folder: String,
    file: String,
}

impl CsvRow {
    fn new(path: &Path) -> Self {
        let (folder, file) = folder_and_file(path);
        Self { folder, file }
    }
}

fn record_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer)
}

/// What a CSV report lists.
#[derive(Debug, Clone, Copy)]
enum Content<'a> {
    Groups(&'a [Vec<PathBuf>]),
    Files(&'a [PathBuf]),
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    content: Content<'a>,
}

impl<'a> CsvOutput<'a> {
    /// Report duplicate groups, separated by blank lines.
    #[must_use]
    pub fn duplicates(groups: &'a [Vec<PathBuf>]) -> Self {
        Self {
            content: Content::Groups(groups),
        }
    }

    /// Report a flat list of files.
    #[must_use]
    pub fn files(files: &'a [PathBuf]) -> Self {
        Self {
            content: Content::Files(files),
        }
    }

    /// Write the report to `writer`.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), CsvOutputError> {
        let mut header = record_writer(&mut writer);
        header.write_record(["Folder", "File"])?;
        header.flush()?;
        drop(header);

        match self.content {
            Content::Groups(groups) => {
                for group in groups {
                    // The csv crate encodes an empty record as `""`, so the
                    // separator goes straight to the underlying writer.
                    writer.write_all(b"\n")?;
                    let mut rows = record_writer(&mut writer);
                    for path in group {
                        rows.serialize(CsvRow::new(path))?;
                    }
                    rows.flush()?;
                }
            }
            Content::Files(files) => {
                let mut rows = record_writer(&mut writer);
                for path in files {
                    rows.serialize(CsvRow::new(path))?;
                }
                rows.flush()?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the report to a new file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if the file cannot be created or written.
    pub fn write_file(&self, path: &Path) -> Result<(), CsvOutputError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Render the report as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
