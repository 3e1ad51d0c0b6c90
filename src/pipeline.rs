//! End-to-end conversion pipeline.
//!
//! One document in, one workbook out, in a single forward pass:
//! raw tables from the source, row expansion, optional per-cell
//! translation, sheet serialization, layout, bytes. Extraction failures
//! abort the run; per-cell translation failures degrade to the original
//! text and only show up in the stats.

use std::sync::Arc;

use log::info;

use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, TableSource};
use crate::model::NormalizedTable;
use crate::session::TranslationMode;
use crate::translate::{
    self, CellTranslator, LanguageDetector, TranslationProvider, TranslationStats,
};
use crate::xlsx::{write_workbook, Layout, Workbook, XLSX_MIME_TYPE};

/// Options for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Table extraction options
    pub extraction: ExtractOptions,

    /// Workbook layout
    pub layout: Layout,

    /// Translate cells of a table in parallel (result positions are
    /// unaffected; only latency changes)
    pub parallel_translation: bool,

    /// Cache translations keyed by (text, target language)
    pub cache_translations: bool,
}

impl PipelineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_extraction(mut self, extraction: ExtractOptions) -> Self {
        self.extraction = extraction;
        self
    }

    /// Set the workbook layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Enable parallel per-cell translation.
    pub fn with_parallel_translation(mut self, parallel: bool) -> Self {
        self.parallel_translation = parallel;
        self
    }

    /// Enable the translation cache.
    pub fn with_translation_cache(mut self, cache: bool) -> Self {
        self.cache_translations = cache;
        self
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The serialized workbook
    pub bytes: Vec<u8>,

    /// Sheet names in workbook order
    pub sheet_names: Vec<String>,

    /// Translation counters, when translation was enabled
    pub translation: Option<TranslationStats>,

    /// MIME type of `bytes`
    pub mime_type: &'static str,
}

/// The conversion pipeline.
///
/// Holds the table source and, optionally, the translation seams. The
/// translation mode is passed per run, so one pipeline can serve both
/// translated and untranslated conversions.
pub struct Pipeline {
    source: Box<dyn TableSource>,
    detector: Option<Arc<dyn LanguageDetector>>,
    provider: Option<Arc<dyn TranslationProvider>>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline over a table source.
    pub fn new(source: Box<dyn TableSource>) -> Self {
        Self {
            source,
            detector: None,
            provider: None,
            options: PipelineOptions::default(),
        }
    }

    /// Attach language identification and translation backends.
    pub fn with_translator(
        mut self,
        detector: Arc<dyn LanguageDetector>,
        provider: Arc<dyn TranslationProvider>,
    ) -> Self {
        self.detector = Some(detector);
        self.provider = Some(provider);
        self
    }

    /// Set pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract and normalize tables without translating or serializing.
    pub fn extract_tables(&self, pdf: &[u8]) -> Result<Vec<NormalizedTable>> {
        let raw = self.source.extract(pdf, &self.options.extraction)?;
        Ok(raw.iter().map(|t| t.normalize()).collect())
    }

    /// Run the full pipeline on a document.
    pub fn run(&self, pdf: &[u8], mode: &TranslationMode) -> Result<ConvertResult> {
        let translator = self.translator_for(mode)?;

        let raw = self.source.extract(pdf, &self.options.extraction)?;
        info!(
            "extracted {} raw tables via {}",
            raw.len(),
            self.source.backend_name()
        );

        let mut workbook = Workbook::new();
        for table in &raw {
            let mut table = table.normalize();
            if table.is_empty() {
                continue;
            }
            if let (Some(translator), TranslationMode::Enabled { target_lang }) =
                (&translator, mode)
            {
                translator.translate_table(&mut table, target_lang);
            }
            workbook.add_table(table);
        }

        workbook.apply_layout(&self.options.layout);
        if workbook.is_empty() {
            return Err(Error::NoTables);
        }

        let stats = translator.as_ref().map(|t| t.stats());
        if let Some(stats) = &stats {
            info!(
                "translation: {} translated, {} same-language, {} empty, {} detection failures, {} translation failures, {} cache hits",
                stats.translated,
                stats.skipped_same_language,
                stats.skipped_empty,
                stats.detection_failures,
                stats.translation_failures,
                stats.cache_hits,
            );
        }

        let bytes = write_workbook(&workbook)?;
        Ok(ConvertResult {
            bytes,
            sheet_names: workbook.sheet_names(),
            translation: stats,
            mime_type: XLSX_MIME_TYPE,
        })
    }

    fn translator_for(&self, mode: &TranslationMode) -> Result<Option<CellTranslator>> {
        let target_lang = match mode {
            TranslationMode::Disabled => return Ok(None),
            TranslationMode::Enabled { target_lang } => target_lang,
        };
        if !translate::is_supported(target_lang) {
            return Err(Error::UnsupportedLanguage(target_lang.clone()));
        }
        let (detector, provider) = match (&self.detector, &self.provider) {
            (Some(d), Some(p)) => (Arc::clone(d), Arc::clone(p)),
            _ => return Err(Error::TranslatorNotConfigured),
        };
        let mut translator = CellTranslator::new(detector, provider)
            .with_parallelism(self.options.parallel_translation);
        if self.options.cache_translations {
            translator = translator.with_cache();
        }
        Ok(Some(translator))
    }
}

/// Serialize normalized tables to JSON for inspection.
pub fn tables_to_json(tables: &[NormalizedTable], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(tables)?
    } else {
        serde_json::to_string(tables)?
    };
    Ok(json)
}
