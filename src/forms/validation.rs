//! Field-level validation for admin forms.

use crate::i18n::{Language, LanguageStrings};
use crate::schedule::{EventType, SessionTime};
use chrono::NaiveDate;

/// Validation errors keyed by field, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; only the first error per field is kept.
    pub fn add(&mut self, field: &str, message: &str) {
        if self.get(field).is_none() {
            self.errors.push((field.to_string(), message.to_string()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

/// Runs checks against raw field values, collecting localized errors.
pub struct Validator {
    strings: &'static LanguageStrings,
    errors: FieldErrors,
}

impl Validator {
    pub fn new(language: Language) -> Self {
        Self {
            strings: language.strings(),
            errors: FieldErrors::new(),
        }
    }

    pub fn finish(self) -> FieldErrors {
        self.errors
    }

    fn fail(&mut self, field: &str, message: &str) {
        self.errors.add(field, message);
    }

    /// Rejects empty and whitespace-only values.
    pub fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, self.strings.field_required);
            return false;
        }
        true
    }

    /// Blank is accepted unless `required`.
    pub fn non_negative_integer(&mut self, field: &str, value: &str, required: bool) -> Option<u64> {
        let value = value.trim();
        if value.is_empty() {
            if required {
                self.fail(field, self.strings.field_required);
            }
            return None;
        }

        match value.parse::<i64>() {
            Ok(n) if n < 0 => {
                self.fail(field, self.strings.field_negative);
                None
            }
            Ok(n) => Some(n as u64),
            Err(_) => {
                self.fail(field, self.strings.field_not_numeric);
                None
            }
        }
    }

    /// Absolute http(s) URL. Blank is accepted.
    pub fn url(&mut self, field: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        let valid = reqwest::Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            self.fail(field, self.strings.field_invalid_url);
        }
        valid
    }

    /// `YYYY-MM-DD`.
    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        if !self.required(field, value) {
            return None;
        }
        let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok();
        if parsed.is_none() {
            self.fail(field, self.strings.field_invalid_date);
        }
        parsed
    }

    /// `HH:MM` or `HH:MM:SS`. Blank is accepted unless `required`.
    pub fn time(&mut self, field: &str, value: &str, required: bool) -> Option<SessionTime> {
        if value.trim().is_empty() {
            if required {
                self.fail(field, self.strings.field_required);
            }
            return None;
        }
        let time = SessionTime::parse(value);
        if !time.is_valid() {
            self.fail(field, self.strings.field_invalid_time);
            return None;
        }
        Some(time)
    }

    pub fn event_type(&mut self, field: &str, value: &str) -> Option<EventType> {
        if !self.required(field, value) {
            return None;
        }
        let parsed = EventType::parse_known(value);
        if parsed.is_none() {
            self.fail(field, self.strings.field_invalid_event_type);
        }
        parsed
    }
}
