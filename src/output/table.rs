//! Rounded-border terminal tables.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use yansi::Paint;

use super::{folder_and_file, relative_to};

const HEADER_COLOR: (u8, u8, u8) = (100, 149, 237);
const BORDER_COLOR: (u8, u8, u8) = (128, 128, 128);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Cells(Vec<String>),
    Separator,
}

/// A table of paths, rendered with box-drawing borders.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
    color: bool,
}

impl Table {
    /// Create an empty table with the given column headers.
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            color: true,
        }
    }

    /// Enable or disable colours.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// A `Folder | File` table of duplicate groups relative to `base`, with
    /// an empty row between groups.
    #[must_use]
    pub fn duplicates(groups: &[Vec<PathBuf>], base: &Path) -> Self {
        let mut table = Self::new(["Folder", "File"]);
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                table.push_separator();
            }
            for path in group {
                let (folder, file) = folder_and_file(&relative_to(path, base));
                let folder = if folder.is_empty() { ".".to_string() } else { folder };
                table.push_row([folder, file]);
            }
        }
        table
    }

    /// A single-column table of paths relative to `base`, headed by `base`.
    #[must_use]
    pub fn files(files: &[PathBuf], base: &Path) -> Self {
        let mut table = Self::new([base.display().to_string()]);
        for path in files {
            table.push_row([relative_to(path, base).display().to_string()]);
        }
        table
    }

    /// Append a row. Missing cells render empty; extra cells are dropped.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(Row::Cells(cells));
    }

    /// Append an empty row.
    pub fn push_separator(&mut self) {
        self.rows.push(Row::Separator);
    }

    /// Number of rows holding cells.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Cells(_)))
            .count()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            if let Row::Cells(cells) = row {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }

    fn border(&self, text: &str) -> String {
        if self.color {
            let (r, g, b) = BORDER_COLOR;
            text.rgb(r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.color {
            let (r, g, b) = HEADER_COLOR;
            text.rgb(r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn rule(&self, widths: &[usize], left: &str, middle: &str, right: &str) -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        self.border(&format!("{left}{}{right}", segments.join(middle)))
    }

    fn line(&self, widths: &[usize], cells: &[String], is_header: bool) -> String {
        let bar = self.border("│");
        let mut line = bar.clone();
        for (width, cell) in widths.iter().zip(cells) {
            let padding = " ".repeat(width - cell.chars().count());
            let text = if is_header {
                self.header(cell)
            } else {
                cell.clone()
            };
            line.push_str(&format!(" {text}{padding} "));
            line.push_str(&bar);
        }
        line
    }

    /// Write the table to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let widths = self.widths();
        let empty: Vec<String> = vec![String::new(); widths.len()];

        writeln!(writer, "{}", self.rule(&widths, "╭", "┬", "╮"))?;
        writeln!(writer, "{}", self.line(&widths, &self.headers, true))?;
        writeln!(writer, "{}", self.rule(&widths, "├", "┼", "┤"))?;
        for row in &self.rows {
            let cells = match row {
                Row::Cells(cells) => cells,
                Row::Separator => &empty,
            };
            writeln!(writer, "{}", self.line(&widths, cells, false))?;
        }
        writeln!(writer, "{}", self.rule(&widths, "╰", "┴", "╯"))?;
        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
