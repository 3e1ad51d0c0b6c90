//! # tabxl
//!
//! Extract tables from PDF documents into translated, formatted Excel
//! workbooks.
//!
//! The pipeline reconstructs row-aligned records from raw table grids
//! (splitting cells the source merged with embedded line breaks),
//! optionally translates every cell into a target language while
//! silently keeping the original text when detection or translation
//! fails, and serializes each table into its own sheet of a
//! wrap-formatted XLSX workbook.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabxl::{convert_file, PipelineOptions, TranslationMode};
//!
//! fn main() -> tabxl::Result<()> {
//!     let result = convert_file(
//!         "report.pdf",
//!         &PipelineOptions::default(),
//!         &TranslationMode::Disabled,
//!     )?;
//!     std::fs::write("report.xlsx", &result.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! Translation plugs in at two seams: a [`LanguageDetector`] and a
//! [`TranslationProvider`]. The CLI crate ships an HTTP implementation;
//! tests use in-memory fakes.

pub mod error;
pub mod expand;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod translate;
pub mod xlsx;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{ExtractOptions, PageSelection, PdftotextSource, TableSource};
pub use model::{NormalizedTable, RawTable};
pub use pipeline::{tables_to_json, ConvertResult, Pipeline, PipelineOptions};
pub use session::{Session, SessionEvent, SessionState, TranslationMode};
pub use translate::{
    CellTranslator, DetectionError, LanguageDetector, TranslationError, TranslationProvider,
    TranslationStats,
};
pub use xlsx::{Layout, Workbook, XLSX_MIME_TYPE};

use std::path::Path;

/// Convert a PDF file to workbook bytes using the pdftotext source.
///
/// Translation requires a configured provider; use [`Pipeline`]
/// directly to attach one. With [`TranslationMode::Disabled`] this is a
/// complete one-call conversion.
pub fn convert_file<P: AsRef<Path>>(
    path: P,
    options: &PipelineOptions,
    mode: &TranslationMode,
) -> Result<ConvertResult> {
    let pdf = std::fs::read(path)?;
    convert_bytes(&pdf, options, mode)
}

/// Convert PDF bytes to workbook bytes using the pdftotext source.
pub fn convert_bytes(
    pdf: &[u8],
    options: &PipelineOptions,
    mode: &TranslationMode,
) -> Result<ConvertResult> {
    Pipeline::new(Box::new(PdftotextSource::new()))
        .with_options(options.clone())
        .run(pdf, mode)
}
