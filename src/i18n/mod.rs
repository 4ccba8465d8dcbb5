//! Internationalization (i18n) module for the bilingual site.
//!
//! All language-related logic, localized strings, and bilingual content
//! resolution is contained here.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and the fallback order
//! - `language`: Type-safe `Language` handle validated against the registry
//! - `strings`: Centralized user-facing strings per language
//! - `localized`: Per-field text map with fallback resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Language, Localized};
//!
//! let title = Localized::from_pair(Some(""), Some("Opening"));
//! assert_eq!(title.resolve(Language::FRENCH), Some("Opening"));
//! ```

mod language;
mod localized;
mod registry;
mod strings;

pub use language::Language;
pub use localized::Localized;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::{LanguageStrings, ENGLISH_STRINGS, FRENCH_STRINGS};
