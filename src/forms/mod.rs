//! CRUD forms for the admin console.
//!
//! Each entity form keeps the values exactly as entered so that a rejected
//! submission can be re-rendered without losing input.

pub mod archive;
pub mod partner;
pub mod session;
pub mod submit;
pub mod validation;

pub use archive::ArchiveForm;
pub use partner::PartnerForm;
pub use session::SessionForm;
pub use submit::{FormSubmitter, SubmitOutcome};
pub use validation::{FieldErrors, Validator};

use crate::backend::{Collection, FileUpload, MultipartPayload, Payload, WriteRequest};
use crate::i18n::Language;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One input as the form template renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `textarea`, `number`, `url`, `date`, `time`, `select` or `file`
    pub input: &'static str,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl FormField {
    pub fn new(name: &'static str, label: &'static str, input: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            input,
            value: value.to_string(),
            required: false,
            error: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_error(mut self, errors: &FieldErrors) -> Self {
        self.error = errors.get(self.name).map(str::to_string);
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }
}

/// Admin form for one backend entity.
pub trait EntityForm: Clone + Default + Send + Sync + 'static {
    type Record: Collection;

    /// Path segment under `/admin`
    const ADMIN_PATH: &'static str;

    fn from_fields(fields: &HashMap<String, String>, file: Option<FileUpload>) -> Self;

    fn from_record(record: &Self::Record) -> Self;

    fn with_id(self, id: u64) -> Self;

    fn record_id(&self) -> Option<u64>;

    fn validate(&self, language: Language) -> FieldErrors;

    /// Wire fields; blank optional values are `null`.
    fn wire_fields(&self) -> Map<String, Value>;

    fn file(&self) -> Option<&FileUpload>;

    fn fields(&self, language: Language, errors: &FieldErrors) -> Vec<FormField>;

    fn heading(language: Language) -> &'static str;

    fn list_columns(language: Language) -> Vec<&'static str>;

    fn list_row(record: &Self::Record, language: Language) -> Vec<String>;

    /// JSON unless a file is attached, then multipart.
    fn payload(&self) -> Payload {
        let fields = self.wire_fields();
        match self.file() {
            None => Payload::Json(Value::Object(fields)),
            Some(file) => {
                let mut multipart = MultipartPayload::default();
                for (name, value) in &fields {
                    let text = match value {
                        Value::Null => continue,
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    multipart = multipart.text(name, &text);
                }
                multipart.file = Some(file.clone());
                Payload::Multipart(multipart)
            }
        }
    }

    fn request(&self) -> WriteRequest {
        let resource = <Self::Record as Collection>::RESOURCE;
        match self.record_id() {
            Some(id) => WriteRequest::update(resource, id, self.payload()),
            None => WriteRequest::create(resource, self.payload()),
        }
    }
}

// ==================== Helpers ====================

/// Pick the French or English variant of a static label.
pub(crate) fn label(language: Language, fr: &'static str, en: &'static str) -> &'static str {
    if language == Language::ENGLISH {
        en
    } else {
        fr
    }
}

pub(crate) fn value(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

/// Trimmed text, or `null` when blank.
pub(crate) fn text_or_null(value: &str) -> Value {
    let value = value.trim();
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

/// Number if it parses, `null` when blank.
pub(crate) fn number_or_null(value: &str) -> Value {
    value
        .trim()
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or(Value::Null)
}

/// Re-target an uploaded file at the field the backend reads it from.
pub(crate) fn attach(file: Option<FileUpload>, field: &str) -> Option<FileUpload> {
    file.filter(|f| !f.bytes.is_empty() && !f.file_name.trim().is_empty())
        .map(|f| FileUpload {
            field: field.to_string(),
            ..f
        })
}

pub(crate) fn opt_string(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub(crate) fn opt_number(value: Option<i64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}
