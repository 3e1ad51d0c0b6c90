//! Conditional, failure-tolerant per-cell translation.
//!
//! Every cell goes through the same policy: trim, skip empty text,
//! identify the source language, skip cells already in the target
//! language, otherwise call the translation provider. Any detection or
//! translation failure keeps the original text; nothing at this layer
//! ever aborts a conversion. Failures are counted and logged so silent
//! degradation stays debuggable without changing user-visible output.

mod languages;

pub use languages::{is_supported, language_code, language_name, supported_languages};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::model::NormalizedTable;

/// Failure to identify the language of a piece of text.
///
/// Never propagated past the translator; mapped by policy to "keep the
/// original text".
#[derive(Error, Debug)]
pub enum DetectionError {
    /// The text matches several languages equally well.
    #[error("ambiguous language")]
    Ambiguous,

    /// The text is too short to identify.
    #[error("text too short to identify")]
    TooShort,

    /// Any other identification failure.
    #[error("{0}")]
    Other(String),
}

/// Failure to translate a piece of text.
///
/// Never propagated past the translator; mapped by policy to "keep the
/// original text". No retry is attempted.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Network-level failure reaching the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider rejected the request for quota reasons.
    #[error("quota exceeded")]
    QuotaExceeded,

    /// The provider rejected the input itself.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Any other provider failure.
    #[error("{0}")]
    Other(String),
}

/// Language identification backend.
pub trait LanguageDetector: Send + Sync {
    /// Identify the language of `text`, returning its code.
    fn identify(&self, text: &str) -> Result<String, DetectionError>;
}

/// Translation backend.
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` into `target`, auto-detecting the source language.
    fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError>;
}

/// Counters describing what happened during a translation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    /// Cells replaced with a translation
    pub translated: usize,
    /// Cells skipped because the trimmed text was empty
    pub skipped_empty: usize,
    /// Cells skipped because they were already in the target language
    pub skipped_same_language: usize,
    /// Cells kept because language identification failed
    pub detection_failures: usize,
    /// Cells kept because the provider failed
    pub translation_failures: usize,
    /// Cells served from the translation cache
    pub cache_hits: usize,
}

impl TranslationStats {
    /// Total number of cells visited.
    pub fn cells(&self) -> usize {
        self.translated
            + self.skipped_empty
            + self.skipped_same_language
            + self.detection_failures
            + self.translation_failures
            + self.cache_hits
    }
}

#[derive(Default)]
struct Counters {
    translated: AtomicUsize,
    skipped_empty: AtomicUsize,
    skipped_same_language: AtomicUsize,
    detection_failures: AtomicUsize,
    translation_failures: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> TranslationStats {
        TranslationStats {
            translated: self.translated.load(Ordering::Relaxed),
            skipped_empty: self.skipped_empty.load(Ordering::Relaxed),
            skipped_same_language: self.skipped_same_language.load(Ordering::Relaxed),
            detection_failures: self.detection_failures.load(Ordering::Relaxed),
            translation_failures: self.translation_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}

/// Applies the conditional translation policy to cells and grids.
pub struct CellTranslator {
    detector: Arc<dyn LanguageDetector>,
    provider: Arc<dyn TranslationProvider>,
    cache: Option<Mutex<HashMap<(String, String), String>>>,
    parallel: bool,
    counters: Counters,
}

impl CellTranslator {
    /// Create a translator with no cache, translating cells serially.
    pub fn new(detector: Arc<dyn LanguageDetector>, provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            detector,
            provider,
            cache: None,
            parallel: false,
            counters: Counters::default(),
        }
    }

    /// Cache successful translations keyed by (original text, target
    /// language). A latency optimization only; results are identical.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Mutex::new(HashMap::new()));
        self
    }

    /// Translate cells of a grid in parallel. Results are written back
    /// to their original positions, so output ordering is unaffected.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Translate a single cell value into `target`.
    ///
    /// Returns the original value unchanged when the trimmed text is
    /// empty, when identification fails, when the text is already in the
    /// target language, or when the provider fails.
    pub fn translate_text(&self, value: &str, target: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.counters.skipped_empty.fetch_add(1, Ordering::Relaxed);
            return value.to_string();
        }

        if let Some(cache) = &self.cache {
            let key = (trimmed.to_string(), target.to_string());
            if let Some(hit) = cache.lock().ok().and_then(|c| c.get(&key).cloned()) {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                return hit;
            }
        }

        let source = match self.detector.identify(trimmed) {
            Ok(lang) => lang,
            Err(err) => {
                debug!("language identification failed, keeping original: {err}");
                self.counters
                    .detection_failures
                    .fetch_add(1, Ordering::Relaxed);
                return value.to_string();
            }
        };

        if source == target {
            self.counters
                .skipped_same_language
                .fetch_add(1, Ordering::Relaxed);
            return value.to_string();
        }

        match self.provider.translate(trimmed, target) {
            Ok(translated) => {
                self.counters.translated.fetch_add(1, Ordering::Relaxed);
                if let Some(cache) = &self.cache {
                    if let Ok(mut cache) = cache.lock() {
                        cache.insert(
                            (trimmed.to_string(), target.to_string()),
                            translated.clone(),
                        );
                    }
                }
                translated
            }
            Err(err) => {
                debug!("translation failed, keeping original: {err}");
                self.counters
                    .translation_failures
                    .fetch_add(1, Ordering::Relaxed);
                value.to_string()
            }
        }
    }

    /// Translate every data cell of a table, left-to-right, top-to-bottom.
    ///
    /// Column labels are left untouched so the sheet structure survives
    /// round trips through external tooling.
    pub fn translate_table(&self, table: &mut NormalizedTable, target: &str) {
        if self.parallel {
            table.rows.par_iter_mut().for_each(|row| {
                for cell in row {
                    *cell = self.translate_text(cell, target);
                }
            });
        } else {
            table.for_each_cell_mut(|cell| *cell = self.translate_text(cell, target));
        }
    }

    /// Snapshot of the counters accumulated so far.
    pub fn stats(&self) -> TranslationStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct FixedDetector(&'static str);

    impl LanguageDetector for FixedDetector {
        fn identify(&self, _text: &str) -> Result<String, DetectionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingDetector;

    impl LanguageDetector for FailingDetector {
        fn identify(&self, _text: &str) -> Result<String, DetectionError> {
            Err(DetectionError::Ambiguous)
        }
    }

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

    struct FailingProvider;

    impl TranslationProvider for FailingProvider {
        fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslationError> {
            Err(TranslationError::Network("connection refused".into()))
        }
    }

    struct PanickingDetector;

    impl LanguageDetector for PanickingDetector {
        fn identify(&self, _text: &str) -> Result<String, DetectionError> {
            panic!("identify must not be called for empty text");
        }
    }

    fn translator(
        detector: impl LanguageDetector + 'static,
        provider: impl TranslationProvider + 'static,
    ) -> CellTranslator {
        CellTranslator::new(Arc::new(detector), Arc::new(provider))
    }

    #[test]
    fn test_empty_text_skips_detection_and_translation() {
        let t = translator(PanickingDetector, FailingProvider);
        assert_eq!(t.translate_text("", "en"), "");
        assert_eq!(t.translate_text("   ", "en"), "   ");
        assert_eq!(t.stats().skipped_empty, 2);
    }

    #[test]
    fn test_same_language_returns_text_unchanged() {
        let provider = UpperProvider::new();
        let t = translator(FixedDetector("en"), provider);
        assert_eq!(t.translate_text("hello", "en"), "hello");
        let stats = t.stats();
        assert_eq!(stats.skipped_same_language, 1);
        assert_eq!(stats.translated, 0);
    }

    #[test]
    fn test_different_language_translates() {
        let t = translator(FixedDetector("fr"), UpperProvider::new());
        assert_eq!(t.translate_text("bonjour", "en"), "BONJOUR");
        assert_eq!(t.stats().translated, 1);
    }

    #[test]
    fn test_detection_failure_keeps_original() {
        let t = translator(FailingDetector, UpperProvider::new());
        assert_eq!(t.translate_text("quoi", "en"), "quoi");
        assert_eq!(t.stats().detection_failures, 1);
    }

    #[test]
    fn test_translation_failure_keeps_original() {
        let t = translator(FixedDetector("fr"), FailingProvider);
        assert_eq!(t.translate_text("bonjour", "en"), "bonjour");
        assert_eq!(t.stats().translation_failures, 1);
    }

    #[test]
    fn test_no_cache_means_repeated_calls() {
        let t = translator(FixedDetector("fr"), UpperProvider::new());
        t.translate_text("salut", "en");
        t.translate_text("salut", "en");
        assert_eq!(t.stats().translated, 2);
    }

    #[test]
    fn test_cache_avoids_second_call() {
        let t = translator(FixedDetector("fr"), UpperProvider::new()).with_cache();
        assert_eq!(t.translate_text("salut", "en"), "SALUT");
        assert_eq!(t.translate_text("salut", "en"), "SALUT");
        let stats = t.stats();
        assert_eq!(stats.translated, 1);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn test_translate_table_visits_every_cell() {
        let mut table = NormalizedTable {
            page: 1,
            index: 1,
            columns: vec!["A".into(), "B".into()],
            rows: vec![
                vec!["un".into(), "deux".into()],
                vec!["".into(), "trois".into()],
            ],
        };
        let t = translator(FixedDetector("fr"), UpperProvider::new());
        t.translate_table(&mut table, "en");
        assert_eq!(table.rows[0], vec!["UN", "DEUX"]);
        assert_eq!(table.rows[1], vec!["", "TROIS"]);
        // labels untouched
        assert_eq!(table.columns, vec!["A", "B"]);
        let stats = t.stats();
        assert_eq!(stats.translated, 3);
        assert_eq!(stats.skipped_empty, 1);
        assert_eq!(stats.cells(), 4);
    }

    #[test]
    fn test_parallel_translation_preserves_positions() {
        let mut table = NormalizedTable {
            page: 1,
            index: 1,
            columns: vec!["A".into()],
            rows: (0..64).map(|i| vec![format!("cell{i}")]).collect(),
        };
        let t = translator(FixedDetector("fr"), UpperProvider::new()).with_parallelism(true);
        t.translate_table(&mut table, "en");
        for (i, row) in table.rows.iter().enumerate() {
            assert_eq!(row[0], format!("CELL{i}"));
        }
        assert_eq!(t.stats().translated, 64);
    }
}
