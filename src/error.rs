//! Error types for the tabxl library.

use std::io;
use thiserror::Error;

/// Result type alias for tabxl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
///
/// Only extraction-level failures abort a conversion. Per-cell language
/// detection and translation failures are absorbed inside the translate
/// module and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The table source could not read the document.
    #[error("Table extraction failed: {0}")]
    Extraction(String),

    /// The document was readable but produced no tables.
    #[error("No tables found in document")]
    NoTables,

    /// The pdftotext binary is not installed.
    #[error("pdftotext not found. Install poppler-utils (apt install poppler-utils / brew install poppler)")]
    PdftotextNotFound,

    /// pdftotext ran but exited with an error.
    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The requested target language is not in the supported catalog.
    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),

    /// Translation was requested but no provider is configured.
    #[error("Translation requested but no translation provider is configured")]
    TranslatorNotConfigured,

    /// Error assembling or writing the workbook.
    #[error("Workbook serialization error: {0}")]
    Serialize(String),

    /// Error writing the XLSX container.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error serializing tables to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
