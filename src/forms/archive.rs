use super::{
    attach, label, number_or_null, opt_number, opt_string, text_or_null, value, EntityForm,
    FieldErrors, FormField, Validator,
};
use crate::backend::{ArchiveRecord, FileUpload};
use crate::i18n::Language;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Past edition of the conference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveForm {
    pub id: Option<u64>,
    pub title_fr: String,
    pub title_en: String,
    pub description_fr: String,
    pub description_en: String,
    pub year: String,
    pub participants: String,
    pub location: String,
    pub link: String,
    pub image: Option<FileUpload>,
    /// URL of the image already stored by the backend
    pub current_image: Option<String>,
}

impl EntityForm for ArchiveForm {
    type Record = ArchiveRecord;

    const ADMIN_PATH: &'static str = "archives";

    fn from_fields(fields: &HashMap<String, String>, file: Option<FileUpload>) -> Self {
        Self {
            id: None,
            title_fr: value(fields, "title_fr"),
            title_en: value(fields, "title_en"),
            description_fr: value(fields, "description_fr"),
            description_en: value(fields, "description_en"),
            year: value(fields, "year"),
            participants: value(fields, "participants"),
            location: value(fields, "location"),
            link: value(fields, "link"),
            image: attach(file, "image"),
            current_image: fields.get("current_image").cloned().filter(|s| !s.is_empty()),
        }
    }

    fn from_record(record: &ArchiveRecord) -> Self {
        Self {
            id: Some(record.id),
            title_fr: opt_string(&record.title_fr),
            title_en: opt_string(&record.title_en),
            description_fr: opt_string(&record.description_fr),
            description_en: opt_string(&record.description_en),
            year: opt_number(record.year),
            participants: opt_number(record.participants),
            location: opt_string(&record.location),
            link: opt_string(&record.link),
            image: None,
            current_image: record.image.clone(),
        }
    }

    fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    fn record_id(&self) -> Option<u64> {
        self.id
    }

    fn validate(&self, language: Language) -> FieldErrors {
        let mut v = Validator::new(language);
        v.required("title_fr", &self.title_fr);
        v.required("title_en", &self.title_en);
        v.non_negative_integer("year", &self.year, true);
        v.non_negative_integer("participants", &self.participants, false);
        v.url("link", &self.link);
        v.finish()
    }

    fn wire_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title_fr".into(), text_or_null(&self.title_fr));
        map.insert("title_en".into(), text_or_null(&self.title_en));
        map.insert("description_fr".into(), text_or_null(&self.description_fr));
        map.insert("description_en".into(), text_or_null(&self.description_en));
        map.insert("year".into(), number_or_null(&self.year));
        map.insert("participants".into(), number_or_null(&self.participants));
        map.insert("location".into(), text_or_null(&self.location));
        map.insert("link".into(), text_or_null(&self.link));
        map
    }

    fn file(&self) -> Option<&FileUpload> {
        self.image.as_ref()
    }

    fn fields(&self, language: Language, errors: &FieldErrors) -> Vec<FormField> {
        let l = |fr, en| label(language, fr, en);
        vec![
            FormField::new("title_fr", l("Titre (FR)", "Title (FR)"), "text", &self.title_fr).required(),
            FormField::new("title_en", l("Titre (EN)", "Title (EN)"), "text", &self.title_en).required(),
            FormField::new("description_fr", l("Description (FR)", "Description (FR)"), "textarea", &self.description_fr),
            FormField::new("description_en", l("Description (EN)", "Description (EN)"), "textarea", &self.description_en),
            FormField::new("year", l("Année", "Year"), "number", &self.year).required(),
            FormField::new("participants", l("Participants", "Participants"), "number", &self.participants),
            FormField::new("location", l("Lieu", "Location"), "text", &self.location),
            FormField::new("link", l("Lien", "Link"), "url", &self.link),
            FormField::new("image", l("Image", "Image"), "file", self.current_image.as_deref().unwrap_or("")),
        ]
        .into_iter()
        .map(|field| field.with_error(errors))
        .collect()
    }

    fn heading(language: Language) -> &'static str {
        language.strings().nav_archives
    }

    fn list_columns(language: Language) -> Vec<&'static str> {
        vec![
            label(language, "Année", "Year"),
            label(language, "Titre", "Title"),
            label(language, "Participants", "Participants"),
        ]
    }

    fn list_row(record: &ArchiveRecord, language: Language) -> Vec<String> {
        vec![
            opt_number(record.year),
            record.title().resolve_or(language, "").to_string(),
            opt_number(record.participants),
        ]
    }
}
