//! Language registry: Single source of truth for all supported languages.
//!
//! This module provides a centralized registry of all languages supported by the
//! site. It uses a singleton pattern with `OnceLock` to ensure thread-safe
//! initialization and access. The registry also owns the fallback order used
//! whenever a bilingual field is blank in the requested language.

use crate::i18n::strings::{LanguageStrings, ENGLISH_STRINGS, FRENCH_STRINGS};
use std::sync::OnceLock;

/// Configuration for a supported language.
///
/// Contains all metadata and settings for a specific language, including
/// its code, names, enabled status, and whether it's the canonical language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "fr", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "French", "English")
    pub name: &'static str,

    /// Native name of the language (e.g., "Français", "English")
    pub native_name: &'static str,

    /// Whether this is the canonical language (site default, first fallback)
    pub is_canonical: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,

    /// User-facing strings for this language
    pub strings: &'static LanguageStrings,
}

/// Global language registry singleton.
///
/// This registry contains all supported languages and provides methods to query
/// and access them. It's initialized once on first access and remains immutable
/// thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if no canonical language is found or if multiple canonical
    /// languages are defined (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Order in which languages are tried when resolving a bilingual field.
    ///
    /// The requested language comes first, then the canonical language, then
    /// every other enabled language in registry order. Codes appear once.
    /// An unknown requested code is skipped.
    pub fn fallback_chain(&self, code: &str) -> Vec<&'static str> {
        let mut chain: Vec<&'static str> = Vec::with_capacity(self.languages.len());

        if let Some(requested) = self.get_by_code(code) {
            chain.push(requested.code);
        }

        let canonical = self.canonical().code;
        if !chain.contains(&canonical) {
            chain.push(canonical);
        }

        for lang in self.list_enabled() {
            if !chain.contains(&lang.code) {
                chain.push(lang.code);
            }
        }

        chain
    }
}

/// Default language configurations.
///
/// French is the canonical language of the conference; English is the
/// second site language.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_canonical: true,
            enabled: true,
            strings: &FRENCH_STRINGS,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: false,
            enabled: true,
            strings: &ENGLISH_STRINGS,
        },
    ]
}
