//! Workbook assembly and layout.
//!
//! Each non-empty normalized table becomes one sheet, named
//! `Page_<page>_Table_<index>` and truncated to the 31-character ceiling
//! the XLSX format imposes. Layout (wrap text, fixed column width) is a
//! workbook-wide post-processing step; applying it twice is the same as
//! applying it once.

mod writer;

pub use writer::write_workbook;

use crate::model::NormalizedTable;

/// MIME type of the generated workbook.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Hard ceiling on sheet name length imposed by the XLSX format.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Uniform cosmetic layout applied to every sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Wrap-text alignment on every cell
    pub wrap_text: bool,

    /// Fixed display width for every column, independent of content
    pub column_width: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            wrap_text: true,
            column_width: 35.0,
        }
    }
}

/// One named page of the output workbook.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sheet name, unique within the workbook, at most 31 characters
    pub name: String,

    /// The table this sheet holds
    pub table: NormalizedTable,
}

/// An ordered collection of sheets plus the layout to render them with.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    layout: Layout,
}

impl Workbook {
    /// Create an empty workbook with the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table as a new sheet. Tables with zero data rows are
    /// skipped and produce no sheet; returns whether a sheet was added.
    pub fn add_table(&mut self, table: NormalizedTable) -> bool {
        if table.is_empty() {
            return false;
        }
        let name = self.unique_name(&sheet_name(table.page, table.index));
        self.sheets.push(Sheet { name, table });
        true
    }

    /// Apply a layout to the whole workbook. Idempotent.
    pub fn apply_layout(&mut self, layout: &Layout) {
        self.layout = layout.clone();
    }

    /// The layout currently in effect.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Sheets in insertion order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet names in insertion order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// A workbook with no sheets cannot be serialized.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Resolve truncation collisions by appending a numeric
    /// disambiguator, shortening the base so the result still fits.
    fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.sheets.iter().any(|s| s.name == name);
        if !taken(base) {
            return base.to_string();
        }
        for n in 2usize.. {
            let suffix = format!("_{n}");
            let room = MAX_SHEET_NAME_LEN - suffix.len();
            let candidate: String = base.chars().take(room).collect::<String>() + &suffix;
            if !taken(&candidate) {
                return candidate;
            }
        }
        unreachable!("disambiguator search is unbounded")
    }
}

/// Build a sheet name for a table: `Page_<page>_Table_<index>`,
/// truncated to 31 characters with forbidden characters replaced.
pub fn sheet_name(page: u32, index: usize) -> String {
    sanitize(&format!("Page_{page}_Table_{index}"))
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}

/// XLSX forbids `[ ] : * ? / \` in sheet names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}
