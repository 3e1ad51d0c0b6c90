//! Table types.

use serde::{Deserialize, Serialize};

use crate::expand;

/// A table as emitted by a table source, prior to normalization.
///
/// The first row of `grid` holds the column labels; the remaining rows
/// are data. Data cells may contain embedded line breaks where the
/// source merged several logical rows into one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    /// 1-based page number the table was found on
    pub page: u32,

    /// 1-based ordinal of the table within the document, in extraction order
    pub index: usize,

    /// Row-major grid of string cells (first row = column labels)
    pub grid: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a raw table from a grid.
    pub fn new(page: u32, index: usize, grid: Vec<Vec<String>>) -> Self {
        Self { page, index, grid }
    }

    /// Number of rows in the grid, including the label row.
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Number of columns (based on the label row).
    pub fn column_count(&self) -> usize {
        self.grid.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Normalize this table: take the first grid row as trimmed column
    /// labels and expand multi-line cells in the remaining rows into
    /// aligned sub-rows.
    pub fn normalize(&self) -> NormalizedTable {
        let mut rows = self.grid.iter();
        let columns = rows
            .next()
            .map(|labels| labels.iter().map(|l| clean_label(l)).collect())
            .unwrap_or_default();
        let data: Vec<Vec<String>> = rows.cloned().collect();

        NormalizedTable {
            page: self.page,
            index: self.index,
            columns,
            rows: expand::expand_rows(&data),
        }
    }
}

/// Column labels are trimmed; an embedded line break inside a label is
/// collapsed to a space so the normalized grid stays line-break-free.
fn clean_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.contains('\n') {
        trimmed
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        trimmed.to_string()
    }
}

/// A rectangular, line-break-free grid produced by row expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTable {
    /// 1-based page number the table was found on
    pub page: u32,

    /// 1-based ordinal of the table within the document
    pub index: usize,

    /// Trimmed column labels
    pub columns: Vec<String>,

    /// Data rows; every row has `columns.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Number of data rows (the label row is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A table with zero data rows produces no sheet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Visit every data cell mutably, left-to-right, top-to-bottom.
    pub fn for_each_cell_mut<F: FnMut(&mut String)>(&mut self, mut f: F) {
        for row in &mut self.rows {
            for cell in row {
                f(cell);
            }
        }
    }
}
