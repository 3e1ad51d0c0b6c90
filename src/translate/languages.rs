//! Supported target languages.

/// Language codes and display names, as accepted by the translation
/// provider. Codes follow the provider's convention (lowercase, with
/// region suffixes for Chinese).
const LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("zh-cn", "Chinese (Simplified)"),
    ("zh-tw", "Chinese (Traditional)"),
    ("nl", "Dutch"),
    ("en", "English"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("de", "German"),
    ("hi", "Hindi"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("es", "Spanish"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
];

/// Check whether a language code is in the supported catalog.
pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Display name for a language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Language code for a display name.
pub fn language_code(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

/// All supported languages as `(code, name)` pairs, sorted by name.
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    LANGUAGES
}
