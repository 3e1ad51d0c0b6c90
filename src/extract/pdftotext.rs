//! Table extraction backend using pdftotext (from poppler-utils).
//!
//! `pdftotext -layout` preserves the whitespace alignment of tabular
//! regions. Columns are recovered by splitting lines on runs of two or
//! more spaces; contiguous runs of multi-column lines become tables.
//! This is a deliberately simple geometry heuristic: the pipeline only
//! requires that a source yields row/column grids of strings.

use std::io::Write;
use std::process::Command;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::{ExtractOptions, TableSource};
use crate::error::{Error, Result};
use crate::model::RawTable;

/// Runs of two or more spaces (or tabs) separate columns in layout output.
fn column_gap() -> &'static Regex {
    static GAP: OnceLock<Regex> = OnceLock::new();
    GAP.get_or_init(|| Regex::new(r"[ \t]{2,}").unwrap())
}

/// Table source backed by the pdftotext binary.
pub struct PdftotextSource;

impl PdftotextSource {
    /// Create a source that shells out to the system pdftotext binary.
    pub fn new() -> Self {
        PdftotextSource
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }

    fn layout_text(&self, pdf: &[u8]) -> Result<String> {
        let mut tmpfile = tempfile::NamedTempFile::new()?;
        tmpfile.write_all(pdf)?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::PdftotextNotFound
                } else {
                    Error::Extraction(format!("pdftotext failed: {e}"))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(Error::PdftotextFailed { code, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PdftotextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSource for PdftotextSource {
    fn extract(&self, pdf: &[u8], options: &ExtractOptions) -> Result<Vec<RawTable>> {
        let text = self.layout_text(pdf)?;

        let mut tables = Vec::new();
        let mut ordinal = 0usize;

        // pdftotext uses form feed \x0c as page separator
        for (i, page_text) in text.split('\x0c').enumerate() {
            let page = (i + 1) as u32;
            if !options.pages.includes(page) {
                continue;
            }
            for grid in detect_grids(page_text, options) {
                ordinal += 1;
                tables.push(RawTable::new(page, ordinal, grid));
            }
        }

        debug!("pdftotext extracted {} tables", tables.len());
        if tables.is_empty() {
            return Err(Error::NoTables);
        }
        Ok(tables)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split a layout line into column cells on runs of 2+ spaces.
fn split_columns(line: &str) -> Vec<String> {
    column_gap()
        .split(line.trim())
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collect contiguous runs of multi-column lines into grids, padded to
/// the widest row of each run.
fn detect_grids(page_text: &str, options: &ExtractOptions) -> Vec<Vec<Vec<String>>> {
    let mut grids = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    let mut flush = |current: &mut Vec<Vec<String>>| {
        if current.len() >= options.min_rows {
            let width = current.iter().map(Vec::len).max().unwrap_or(0);
            for row in current.iter_mut() {
                row.resize(width, String::new());
            }
            grids.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for line in page_text.lines() {
        let cells = split_columns(line);
        if cells.len() >= options.min_columns {
            current.push(cells);
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);

    grids
}
