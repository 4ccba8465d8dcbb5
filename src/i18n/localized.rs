//! Localized text: one value per language code, resolved through the
//! registry's fallback chain.

use crate::i18n::{Language, LanguageRegistry};
use std::collections::BTreeMap;

/// A piece of text available in zero or more languages.
///
/// Blank values (empty or whitespace-only) are treated as missing, so a
/// resolved value is never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Localized {
    values: BTreeMap<&'static str, String>,
}

impl Localized {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the backend's parallel `_fr` / `_en` fields.
    pub fn from_pair(fr: Option<&str>, en: Option<&str>) -> Self {
        let mut localized = Self::new();
        if let Some(fr) = fr {
            localized.set(Language::FRENCH, fr);
        }
        if let Some(en) = en {
            localized.set(Language::ENGLISH, en);
        }
        localized
    }

    /// Same text for every language (names, acronyms).
    pub fn uniform(text: &str) -> Self {
        let mut localized = Self::new();
        for config in LanguageRegistry::get().list_enabled() {
            if let Ok(language) = Language::from_code(config.code) {
                localized.set(language, text);
            }
        }
        localized
    }

    pub fn with(mut self, language: Language, text: &str) -> Self {
        self.set(language, text);
        self
    }

    /// Store a value; blank input removes any previous value.
    pub fn set(&mut self, language: Language, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.values.remove(language.code());
        } else {
            self.values.insert(language.code(), trimmed.to_string());
        }
    }

    /// Value stored for exactly this language, without fallback.
    pub fn get(&self, language: Language) -> Option<&str> {
        self.values.get(language.code()).map(String::as_str)
    }

    /// First non-blank value along the fallback chain of `language`.
    pub fn resolve(&self, language: Language) -> Option<&str> {
        LanguageRegistry::get()
            .fallback_chain(language.code())
            .into_iter()
            .find_map(|code| self.values.get(code).map(String::as_str))
    }

    /// Resolve, or return `default` when no language has a value.
    pub fn resolve_or<'a>(&'a self, language: Language, default: &'a str) -> &'a str {
        self.resolve(language).unwrap_or(default)
    }

    pub fn is_blank(&self) -> bool {
        self.values.is_empty()
    }
}
