//! Data model for the extraction-to-workbook pipeline.
//!
//! `RawTable` is what a table source emits; `NormalizedTable` is the
//! rectangular, line-break-free grid the rest of the pipeline operates on.

mod table;

pub use table::{NormalizedTable, RawTable};
