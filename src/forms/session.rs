use super::{label, opt_string, text_or_null, value, EntityForm, FieldErrors, FormField, SelectOption, Validator};
use crate::backend::{FileUpload, SessionRecord};
use crate::i18n::Language;
use crate::schedule::{parse_day, EventType, SessionTime};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Programme entry. Sessions never carry a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionForm {
    pub id: Option<u64>,
    pub day: String,
    pub time: String,
    pub end_time: String,
    pub title_fr: String,
    pub title_en: String,
    pub description_fr: String,
    pub description_en: String,
    pub speaker_fr: String,
    pub speaker_en: String,
    pub location_fr: String,
    pub location_en: String,
    pub event_type: String,
}

/// `HH:MM` when the entered time parses, otherwise the trimmed input.
fn normalized_time(raw: &str) -> Value {
    let time = SessionTime::parse(raw);
    if time.is_valid() {
        Value::String(time.to_string())
    } else {
        text_or_null(raw)
    }
}

impl EntityForm for SessionForm {
    type Record = SessionRecord;

    const ADMIN_PATH: &'static str = "programme";

    fn from_fields(fields: &HashMap<String, String>, _file: Option<FileUpload>) -> Self {
        Self {
            id: None,
            day: value(fields, "day"),
            time: value(fields, "time"),
            end_time: value(fields, "end_time"),
            title_fr: value(fields, "title_fr"),
            title_en: value(fields, "title_en"),
            description_fr: value(fields, "description_fr"),
            description_en: value(fields, "description_en"),
            speaker_fr: value(fields, "speaker_fr"),
            speaker_en: value(fields, "speaker_en"),
            location_fr: value(fields, "location_fr"),
            location_en: value(fields, "location_en"),
            event_type: value(fields, "event_type"),
        }
    }

    fn from_record(record: &SessionRecord) -> Self {
        let day = record.day.as_deref().unwrap_or("");
        Self {
            id: Some(record.id),
            day: parse_day(day)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| day.to_string()),
            time: opt_string(&record.time),
            end_time: opt_string(&record.end_time),
            title_fr: opt_string(&record.title_fr),
            title_en: opt_string(&record.title_en),
            description_fr: opt_string(&record.description_fr),
            description_en: opt_string(&record.description_en),
            speaker_fr: opt_string(&record.speaker_fr),
            speaker_en: opt_string(&record.speaker_en),
            location_fr: opt_string(&record.location_fr),
            location_en: opt_string(&record.location_en),
            event_type: record
                .event_type
                .as_deref()
                .and_then(EventType::parse_known)
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| opt_string(&record.event_type)),
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
        v.date("day", &self.day);
        v.time("time", &self.time, true);
        v.time("end_time", &self.end_time, false);
        v.required("title_fr", &self.title_fr);
        v.required("title_en", &self.title_en);
        v.event_type("event_type", &self.event_type);
        v.finish()
    }

    fn wire_fields(&self) -> Map<String, Value> {
        let event_type = EventType::parse_known(&self.event_type)
            .map(|t| Value::String(t.as_str().to_string()))
            .unwrap_or_else(|| text_or_null(&self.event_type));

        let mut map = Map::new();
        map.insert("day".into(), text_or_null(&self.day));
        map.insert("time".into(), normalized_time(&self.time));
        map.insert("end_time".into(), normalized_time(&self.end_time));
        map.insert("title_fr".into(), text_or_null(&self.title_fr));
        map.insert("title_en".into(), text_or_null(&self.title_en));
        map.insert("description_fr".into(), text_or_null(&self.description_fr));
        map.insert("description_en".into(), text_or_null(&self.description_en));
        map.insert("speaker_fr".into(), text_or_null(&self.speaker_fr));
        map.insert("speaker_en".into(), text_or_null(&self.speaker_en));
        map.insert("location_fr".into(), text_or_null(&self.location_fr));
        map.insert("location_en".into(), text_or_null(&self.location_en));
        map.insert("event_type".into(), event_type);
        map
    }

    fn file(&self) -> Option<&FileUpload> {
        None
    }

    fn fields(&self, language: Language, errors: &FieldErrors) -> Vec<FormField> {
        let l = |fr, en| label(language, fr, en);
        let strings = language.strings();
        let selected = EventType::parse_known(&self.event_type);
        let options = EventType::ALL
            .iter()
            .map(|t| SelectOption {
                value: t.as_str().to_string(),
                label: strings.event_label(t.ordinal()).to_string(),
                selected: selected == Some(*t),
            })
            .collect();

        vec![
            FormField::new("day", l("Date", "Date"), "date", &self.day).required(),
            FormField::new("time", l("Heure de début", "Start time"), "time", &self.time).required(),
            FormField::new("end_time", l("Heure de fin", "End time"), "time", &self.end_time),
            FormField::new("event_type", l("Type", "Type"), "select", &self.event_type)
                .required()
                .with_options(options),
            FormField::new("title_fr", l("Titre (FR)", "Title (FR)"), "text", &self.title_fr).required(),
            FormField::new("title_en", l("Titre (EN)", "Title (EN)"), "text", &self.title_en).required(),
            FormField::new("description_fr", l("Description (FR)", "Description (FR)"), "textarea", &self.description_fr),
            FormField::new("description_en", l("Description (EN)", "Description (EN)"), "textarea", &self.description_en),
            FormField::new("speaker_fr", l("Intervenant (FR)", "Speaker (FR)"), "text", &self.speaker_fr),
            FormField::new("speaker_en", l("Intervenant (EN)", "Speaker (EN)"), "text", &self.speaker_en),
            FormField::new("location_fr", l("Lieu (FR)", "Location (FR)"), "text", &self.location_fr),
            FormField::new("location_en", l("Lieu (EN)", "Location (EN)"), "text", &self.location_en),
        ]
        .into_iter()
        .map(|field| field.with_error(errors))
        .collect()
    }

    fn heading(language: Language) -> &'static str {
        language.strings().nav_programme
    }

    fn list_columns(language: Language) -> Vec<&'static str> {
        vec![
            label(language, "Date", "Date"),
            label(language, "Heure", "Time"),
            label(language, "Titre", "Title"),
            label(language, "Type", "Type"),
        ]
    }

    fn list_row(record: &SessionRecord, language: Language) -> Vec<String> {
        let event_type = EventType::parse(record.event_type.as_deref().unwrap_or(""));
        vec![
            record
                .day
                .as_deref()
                .and_then(parse_day)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            SessionTime::parse(record.time.as_deref().unwrap_or("")).to_string(),
            record.title().resolve_or(language, "").to_string(),
            language.strings().event_label(event_type.ordinal()).to_string(),
        ]
    }
}
