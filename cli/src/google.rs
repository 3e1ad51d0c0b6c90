//! Translation backend using the public Google Translate web endpoint.
//!
//! One blocking HTTP request per cell. The endpoint reports the
//! detected source language alongside the translation, so the same
//! client serves as both the language detector and the translation
//! provider. Errors are mapped onto the library's seam error types and
//! are never retried here.

use log::trace;
use serde_json::Value;

use tabxl::translate::{DetectionError, TranslationError};
use tabxl::{LanguageDetector, TranslationProvider};

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

pub struct GoogleWebTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleWebTranslator {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Issue one request; returns (translated text, detected source language).
    fn request(&self, text: &str, target: &str) -> Result<(String, String), TranslationError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TranslationError::QuotaExceeded);
        }
        if status.is_client_error() {
            return Err(TranslationError::MalformedInput(status.to_string()));
        }
        if !status.is_success() {
            return Err(TranslationError::Other(format!(
                "unexpected status {status}"
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| TranslationError::Other(format!("unreadable response: {e}")))?;
        parse_response(&body)
    }
}

impl Default for GoogleWebTranslator {
    fn default() -> Self {
        Self::new()
    }
}

/// Response shape: `[[["<segment>", ...], ...], _, "<detected lang>", ...]`.
fn parse_response(body: &Value) -> Result<(String, String), TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Other("missing translation segments".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(text);
        }
    }

    let detected = body
        .get(2)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();

    trace!("translated {} chars, detected '{detected}'", translated.len());
    Ok((translated, detected))
}

impl TranslationProvider for GoogleWebTranslator {
    fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        let (translated, _) = self.request(text, target)?;
        if translated.is_empty() {
            return Err(TranslationError::Other("empty translation".to_string()));
        }
        Ok(translated)
    }
}

impl LanguageDetector for GoogleWebTranslator {
    fn identify(&self, text: &str) -> Result<String, DetectionError> {
        // The endpoint always reports a detected source language; the
        // target is irrelevant for identification.
        let (_, detected) = self
            .request(text, "en")
            .map_err(|e| DetectionError::Other(e.to_string()))?;
        if detected.is_empty() {
            return Err(DetectionError::Ambiguous);
        }
        Ok(detected)
    }
}
