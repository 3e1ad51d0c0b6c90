//! End-to-end pipeline tests with in-memory table source and
//! translation backends.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tabxl::translate::{DetectionError, TranslationError};
use tabxl::{
    ExtractOptions, LanguageDetector, Pipeline, PipelineOptions, RawTable, TableSource,
    TranslationMode, TranslationProvider, XLSX_MIME_TYPE,
};

use common::read_sheets;

/// Table source yielding a fixed set of raw tables.
struct FakeSource {
    tables: Vec<RawTable>,
}

impl FakeSource {
    fn new(tables: Vec<RawTable>) -> Self {
        Self { tables }
    }
}

impl TableSource for FakeSource {
    fn extract(&self, _pdf: &[u8], _options: &ExtractOptions) -> tabxl::Result<Vec<RawTable>> {
        Ok(self.tables.clone())
    }

    fn backend_name(&self) -> &str {
        "fake"
    }
}

/// Detector that reports the same language for every cell.
struct FixedDetector(&'static str);

impl LanguageDetector for FixedDetector {
    fn identify(&self, _text: &str) -> Result<String, DetectionError> {
        Ok(self.0.to_string())
    }
}

/// Provider that uppercases text and counts invocations.
struct UpperProvider {
    calls: AtomicUsize,
}

impl UpperProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl TranslationProvider for UpperProvider {
    fn translate(&self, text: &str, _target: &str) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.to_uppercase())
    }
}

/// Provider that always fails.
struct BrokenProvider;

impl TranslationProvider for BrokenProvider {
    fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslationError> {
        Err(TranslationError::Network("boom".to_string()))
    }
}

fn raw(page: u32, index: usize, grid: &[&[&str]]) -> RawTable {
    RawTable::new(
        page,
        index,
        grid.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

/// One-page document, single 2x2 table: a label row plus one data row
/// whose second cell merges two logical rows.
fn multiline_document() -> Vec<RawTable> {
    vec![raw(1, 1, &[&["Code", "Desc"], &["X", "A\nB"]])]
}

#[test]
fn test_multiline_cell_expands_into_sheet_rows() {
    let pipeline = Pipeline::new(Box::new(FakeSource::new(multiline_document())));
    let result = pipeline.run(b"%PDF", &TranslationMode::Disabled).unwrap();

    assert_eq!(result.sheet_names, vec!["Page_1_Table_1"]);
    assert_eq!(result.mime_type, XLSX_MIME_TYPE);

    let sheets = read_sheets(&result.bytes);
    assert_eq!(sheets.len(), 1);
    let (name, grid) = &sheets[0];
    assert_eq!(name, "Page_1_Table_1");
    // 1 header + 2 expanded data rows
    assert_eq!(grid.len(), 3);
    assert_eq!(grid[0], vec!["Code", "Desc"]);
    assert_eq!(grid[1], vec!["X", "A"]);
    assert_eq!(grid[2], vec!["", "B"]);
}

#[test]
fn test_disabled_translation_is_byte_identical() {
    let tables = vec![raw(
        1,
        1,
        &[&["H1", "H2"], &["  spaced  ", "a&b <c>"], &["x\ny", "z"]],
    )];
    let pipeline = Pipeline::new(Box::new(FakeSource::new(tables)));
    let result = pipeline.run(b"%PDF", &TranslationMode::Disabled).unwrap();

    let sheets = read_sheets(&result.bytes);
    let grid = &sheets[0].1;
    assert_eq!(grid[1], vec!["  spaced  ", "a&b <c>"]);
    assert_eq!(grid[2], vec!["x", "z"]);
    assert_eq!(grid[3], vec!["y", ""]);
    assert!(result.translation.is_none());
}

#[test]
fn test_same_language_target_is_a_noop_for_every_cell() {
    let provider = Arc::new(UpperProvider::new());
    let pipeline = Pipeline::new(Box::new(FakeSource::new(multiline_document())))
        .with_translator(Arc::new(FixedDetector("en")), provider.clone());
    let result = pipeline
        .run(
            b"%PDF",
            &TranslationMode::Enabled {
                target_lang: "en".to_string(),
            },
        )
        .unwrap();

    let sheets = read_sheets(&result.bytes);
    assert_eq!(sheets[0].1[1], vec!["X", "A"]);
    assert_eq!(sheets[0].1[2], vec!["", "B"]);

    // no provider call was made
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    let stats = result.translation.unwrap();
    assert_eq!(stats.translated, 0);
    assert_eq!(stats.skipped_same_language, 3);
    assert_eq!(stats.skipped_empty, 1);
}

#[test]
fn test_foreign_cells_are_translated() {
    let pipeline = Pipeline::new(Box::new(FakeSource::new(multiline_document())))
        .with_translator(Arc::new(FixedDetector("fr")), Arc::new(UpperProvider::new()));
    let result = pipeline
        .run(
            b"%PDF",
            &TranslationMode::Enabled {
                target_lang: "en".to_string(),
            },
        )
        .unwrap();

    let sheets = read_sheets(&result.bytes);
    // data cells translated, labels untouched
    assert_eq!(sheets[0].1[0], vec!["Code", "Desc"]);
    assert_eq!(sheets[0].1[1], vec!["X", "A"]);
    assert_eq!(sheets[0].1[2], vec!["", "B"]);
    assert_eq!(result.translation.unwrap().translated, 3);
}

#[test]
fn test_provider_failures_keep_original_text() {
    let pipeline = Pipeline::new(Box::new(FakeSource::new(multiline_document())))
        .with_translator(Arc::new(FixedDetector("fr")), Arc::new(BrokenProvider));
    let result = pipeline
        .run(
            b"%PDF",
            &TranslationMode::Enabled {
                target_lang: "en".to_string(),
            },
        )
        .unwrap();

    let sheets = read_sheets(&result.bytes);
    assert_eq!(sheets[0].1[1], vec!["X", "A"]);
    assert_eq!(sheets[0].1[2], vec!["", "B"]);
    assert_eq!(result.translation.unwrap().translation_failures, 3);
}

#[test]
fn test_empty_tables_are_dropped_and_ordering_kept() {
    let tables = vec![
        raw(1, 1, &[&["A", "B"], &["1", "2"]]),
        raw(1, 2, &[&["only", "labels"]]),
        raw(3, 3, &[&["C"], &["x"], &["y"]]),
    ];
    let pipeline = Pipeline::new(Box::new(FakeSource::new(tables)));
    let result = pipeline.run(b"%PDF", &TranslationMode::Disabled).unwrap();
    assert_eq!(result.sheet_names, vec!["Page_1_Table_1", "Page_3_Table_3"]);
}

#[test]
fn test_parallel_translation_writes_back_in_position() {
    let grid: Vec<Vec<String>> = std::iter::once(vec!["H".to_string()])
        .chain((0..50).map(|i| vec![format!("mot{i}")]))
        .collect();
    let tables = vec![RawTable::new(1, 1, grid)];
    let pipeline = Pipeline::new(Box::new(FakeSource::new(tables)))
        .with_translator(Arc::new(FixedDetector("fr")), Arc::new(UpperProvider::new()))
        .with_options(PipelineOptions::new().with_parallel_translation(true));
    let result = pipeline
        .run(
            b"%PDF",
            &TranslationMode::Enabled {
                target_lang: "en".to_string(),
            },
        )
        .unwrap();

    let sheets = read_sheets(&result.bytes);
    for (i, row) in sheets[0].1.iter().skip(1).enumerate() {
        assert_eq!(row[0], format!("MOT{i}"));
    }
}

#[test]
fn test_cache_reuses_repeated_values() {
    let tables = vec![raw(
        1,
        1,
        &[&["H"], &["dupe"], &["dupe"], &["dupe"]],
    )];
    let provider = Arc::new(UpperProvider::new());
    let pipeline = Pipeline::new(Box::new(FakeSource::new(tables)))
        .with_translator(Arc::new(FixedDetector("fr")), provider.clone())
        .with_options(PipelineOptions::new().with_translation_cache(true));
    let result = pipeline
        .run(
            b"%PDF",
            &TranslationMode::Enabled {
                target_lang: "en".to_string(),
            },
        )
        .unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    let stats = result.translation.unwrap();
    assert_eq!(stats.translated, 1);
    assert_eq!(stats.cache_hits, 2);
}

#[test]
fn test_session_gate_drives_pipeline_mode() {
    use tabxl::{Session, SessionEvent};

    let mut session = Session::new();
    session.handle(SessionEvent::FileUploaded).unwrap();
    session
        .handle(SessionEvent::TranslationToggled(true))
        .unwrap();
    session
        .handle(SessionEvent::LanguageConfirmed("en".to_string()))
        .unwrap();
    let mode = session.begin_processing().unwrap();

    let pipeline = Pipeline::new(Box::new(FakeSource::new(multiline_document())))
        .with_translator(Arc::new(FixedDetector("en")), Arc::new(UpperProvider::new()));
    let result = pipeline.run(b"%PDF", &mode).unwrap();
    session.handle(SessionEvent::ProcessingFinished).unwrap();

    assert_eq!(result.sheet_names.len(), 1);
}
