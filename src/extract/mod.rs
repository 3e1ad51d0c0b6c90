//! Table source boundary.
//!
//! Table-geometry detection is an external concern; the pipeline only
//! depends on the [`TableSource`] trait. A poppler-based default
//! implementation lives in [`pdftotext`].

pub mod pdftotext;

pub use pdftotext::PdftotextSource;

use crate::error::Result;
use crate::model::RawTable;

/// Options controlling table extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Pages to read tables from
    pub pages: PageSelection,

    /// Minimum number of columns for a line block to count as a table
    pub min_columns: usize,

    /// Minimum number of rows (including the label row) for a table
    pub min_rows: usize,
}

impl ExtractOptions {
    /// Create extraction options with defaults.
    pub fn new() -> Self {
        Self {
            pages: PageSelection::All,
            min_columns: 2,
            min_rows: 2,
        }
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set the minimum column count for table detection.
    pub fn with_min_columns(mut self, min: usize) -> Self {
        self.min_columns = min.max(1);
        self
    }

    /// Set the minimum row count for table detection.
    pub fn with_min_rows(mut self, min: usize) -> Self {
        self.min_rows = min.max(1);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// Read all pages
    #[default]
    All,
    /// Read a range of pages (inclusive, 1-indexed)
    Range(std::ops::RangeInclusive<u32>),
    /// Read specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges
        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                for p in start..=end {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort();
        Ok(PageSelection::Pages(pages))
    }
}

/// Trait for table extraction backends.
///
/// An implementation turns PDF bytes into an ordered list of raw
/// tables, each tagged with its page number and a document-wide
/// 1-based ordinal. Implementations fail hard: an unreadable document
/// or a document with no tables is an error, not an empty result.
pub trait TableSource: Send + Sync {
    /// Extract raw tables from PDF bytes.
    fn extract(&self, pdf: &[u8], options: &ExtractOptions) -> Result<Vec<RawTable>>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
