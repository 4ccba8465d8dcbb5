use super::{
    attach, label, number_or_null, opt_number, opt_string, text_or_null, value, EntityForm,
    FieldErrors, FormField, Validator,
};
use crate::backend::{FileUpload, PartnerRecord};
use crate::i18n::Language;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerForm {
    pub id: Option<u64>,
    pub name_fr: String,
    pub name_en: String,
    pub description_fr: String,
    pub description_en: String,
    pub website: String,
    pub display_order: String,
    pub logo: Option<FileUpload>,
    pub current_logo: Option<String>,
}

impl EntityForm for PartnerForm {
    type Record = PartnerRecord;

    const ADMIN_PATH: &'static str = "partners";

    fn from_fields(fields: &HashMap<String, String>, file: Option<FileUpload>) -> Self {
        Self {
            id: None,
            name_fr: value(fields, "name_fr"),
            name_en: value(fields, "name_en"),
            description_fr: value(fields, "description_fr"),
            description_en: value(fields, "description_en"),
            website: value(fields, "website"),
            display_order: value(fields, "display_order"),
            logo: attach(file, "logo"),
            current_logo: fields.get("current_logo").cloned().filter(|s| !s.is_empty()),
        }
    }

    fn from_record(record: &PartnerRecord) -> Self {
        Self {
            id: Some(record.id),
            name_fr: opt_string(&record.name_fr),
            name_en: opt_string(&record.name_en),
            description_fr: opt_string(&record.description_fr),
            description_en: opt_string(&record.description_en),
            website: opt_string(&record.website),
            display_order: opt_number(record.display_order),
            logo: None,
            current_logo: record.logo.clone(),
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
        v.required("name_fr", &self.name_fr);
        v.required("name_en", &self.name_en);
        v.url("website", &self.website);
        v.non_negative_integer("display_order", &self.display_order, false);
        v.finish()
    }

    fn wire_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name_fr".into(), text_or_null(&self.name_fr));
        map.insert("name_en".into(), text_or_null(&self.name_en));
        map.insert("description_fr".into(), text_or_null(&self.description_fr));
        map.insert("description_en".into(), text_or_null(&self.description_en));
        map.insert("website".into(), text_or_null(&self.website));
        map.insert("display_order".into(), number_or_null(&self.display_order));
        map
    }

    fn file(&self) -> Option<&FileUpload> {
        self.logo.as_ref()
    }

    fn fields(&self, language: Language, errors: &FieldErrors) -> Vec<FormField> {
        let l = |fr, en| label(language, fr, en);
        vec![
            FormField::new("name_fr", l("Nom (FR)", "Name (FR)"), "text", &self.name_fr).required(),
            FormField::new("name_en", l("Nom (EN)", "Name (EN)"), "text", &self.name_en).required(),
            FormField::new("description_fr", l("Description (FR)", "Description (FR)"), "textarea", &self.description_fr),
            FormField::new("description_en", l("Description (EN)", "Description (EN)"), "textarea", &self.description_en),
            FormField::new("website", l("Site web", "Website"), "url", &self.website),
            FormField::new("display_order", l("Ordre d'affichage", "Display order"), "number", &self.display_order),
            FormField::new("logo", l("Logo", "Logo"), "file", self.current_logo.as_deref().unwrap_or("")),
        ]
        .into_iter()
        .map(|field| field.with_error(errors))
        .collect()
    }

    fn heading(language: Language) -> &'static str {
        language.strings().nav_partners
    }

    fn list_columns(language: Language) -> Vec<&'static str> {
        vec![
            label(language, "Ordre", "Order"),
            label(language, "Nom", "Name"),
            label(language, "Site web", "Website"),
        ]
    }

    fn list_row(record: &PartnerRecord, language: Language) -> Vec<String> {
        vec![
            opt_number(record.display_order),
            record.name().resolve_or(language, "").to_string(),
            opt_string(&record.website),
        ]
    }
}
