//! Wire records for the backend collections.
//!
//! Bilingual text arrives as parallel `_fr` / `_en` fields; accessors turn
//! each pair into a `Localized`. Numbers are accepted either as JSON numbers
//! or as numeric strings, which is what the backend's form-encoded writes
//! tend to leave behind.

use crate::i18n::{Language, Localized};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A collection the backend exposes as a list endpoint.
pub trait Collection: for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    /// Listing path, relative to the API base
    const PATH: &'static str;

    /// Resource path for show/store/update/destroy
    const RESOURCE: &'static str;

    /// Name used in logs
    const NAME: &'static str;

    fn id(&self) -> u64;
}

/// What a public list page shows for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: u64,
    pub heading: String,
    pub subheading: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

/// Records that can be listed on a public page.
pub trait Summarize {
    fn summarize(&self, language: Language) -> ListItem;
}

fn pair(fr: &Option<String>, en: &Option<String>) -> Localized {
    Localized::from_pair(fr.as_deref(), en.as_deref())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn resolved(text: &Localized, language: Language) -> Option<String> {
    text.resolve(language).map(str::to_string)
}

// ==================== Lenient Number Decoding ====================

pub(crate) mod lenient {
    use super::*;

    fn as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        as_i64(&value)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", value)))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(as_i64))
    }
}

// ==================== Programme ====================

/// One programme session as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default, alias = "date")]
    pub day: Option<String>,
    #[serde(default, alias = "start_time")]
    pub time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub description_fr: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default, alias = "speaker_name_fr")]
    pub speaker_fr: Option<String>,
    #[serde(default, alias = "speaker_name_en")]
    pub speaker_en: Option<String>,
    #[serde(default)]
    pub location_fr: Option<String>,
    #[serde(default)]
    pub location_en: Option<String>,
    #[serde(default, alias = "type")]
    pub event_type: Option<String>,
}

impl SessionRecord {
    pub fn title(&self) -> Localized {
        pair(&self.title_fr, &self.title_en)
    }

    pub fn description(&self) -> Localized {
        pair(&self.description_fr, &self.description_en)
    }

    pub fn speaker(&self) -> Localized {
        pair(&self.speaker_fr, &self.speaker_en)
    }

    pub fn location(&self) -> Localized {
        pair(&self.location_fr, &self.location_en)
    }
}

impl Collection for SessionRecord {
    const PATH: &'static str = "programme/all";
    const RESOURCE: &'static str = "programme";
    const NAME: &'static str = "programme";

    fn id(&self) -> u64 {
        self.id
    }
}

// ==================== Archives ====================

/// A past edition of the conference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub description_fr: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub participants: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl ArchiveRecord {
    pub fn title(&self) -> Localized {
        pair(&self.title_fr, &self.title_en)
    }

    pub fn description(&self) -> Localized {
        pair(&self.description_fr, &self.description_en)
    }
}

impl Collection for ArchiveRecord {
    const PATH: &'static str = "archives";
    const RESOURCE: &'static str = "archives";
    const NAME: &'static str = "archives";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Summarize for ArchiveRecord {
    fn summarize(&self, language: Language) -> ListItem {
        let meta: Vec<String> = [
            self.year.map(|y| y.to_string()),
            non_blank(&self.location),
            self.participants.map(|p| format!("{} participants", p)),
        ]
        .into_iter()
        .flatten()
        .collect();

        ListItem {
            id: self.id,
            heading: self.title().resolve_or(language, "").to_string(),
            subheading: (!meta.is_empty()).then(|| meta.join(" · ")),
            body: resolved(&self.description(), language),
            image: non_blank(&self.image),
            link: non_blank(&self.link),
        }
    }
}

// ==================== Partners ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default)]
    pub name_fr: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub description_fr: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, alias = "order", deserialize_with = "lenient::opt_i64")]
    pub display_order: Option<i64>,
}

impl PartnerRecord {
    pub fn name(&self) -> Localized {
        pair(&self.name_fr, &self.name_en)
    }

    pub fn description(&self) -> Localized {
        pair(&self.description_fr, &self.description_en)
    }
}

impl Collection for PartnerRecord {
    const PATH: &'static str = "partners";
    const RESOURCE: &'static str = "partners";
    const NAME: &'static str = "partners";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Summarize for PartnerRecord {
    fn summarize(&self, language: Language) -> ListItem {
        ListItem {
            id: self.id,
            heading: self.name().resolve_or(language, "").to_string(),
            subheading: None,
            body: resolved(&self.description(), language),
            image: non_blank(&self.logo),
            link: non_blank(&self.website),
        }
    }
}

// ==================== Speakers ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "position_fr")]
    pub title_fr: Option<String>,
    #[serde(default, alias = "position_en")]
    pub title_en: Option<String>,
    #[serde(default)]
    pub bio_fr: Option<String>,
    #[serde(default)]
    pub bio_en: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, alias = "order", deserialize_with = "lenient::opt_i64")]
    pub display_order: Option<i64>,
}

impl Collection for SpeakerRecord {
    const PATH: &'static str = "speakers";
    const RESOURCE: &'static str = "speakers";
    const NAME: &'static str = "speakers";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Summarize for SpeakerRecord {
    fn summarize(&self, language: Language) -> ListItem {
        let role = pair(&self.title_fr, &self.title_en);
        let subheading = match (resolved(&role, language), non_blank(&self.institution)) {
            (Some(role), Some(institution)) => Some(format!("{}, {}", role, institution)),
            (role, institution) => role.or(institution),
        };

        ListItem {
            id: self.id,
            heading: non_blank(&self.name).unwrap_or_default(),
            subheading,
            body: resolved(&pair(&self.bio_fr, &self.bio_en), language),
            image: non_blank(&self.photo),
            link: None,
        }
    }
}

// ==================== Committee ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitteeMemberRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// e.g. `president`, `member`, `scientific`, `organizing`
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub institution_fr: Option<String>,
    #[serde(default)]
    pub institution_en: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, alias = "order", deserialize_with = "lenient::opt_i64")]
    pub display_order: Option<i64>,
}

impl Collection for CommitteeMemberRecord {
    const PATH: &'static str = "comite";
    const RESOURCE: &'static str = "comite";
    const NAME: &'static str = "committee";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Summarize for CommitteeMemberRecord {
    fn summarize(&self, language: Language) -> ListItem {
        ListItem {
            id: self.id,
            heading: non_blank(&self.name).unwrap_or_default(),
            subheading: non_blank(&self.role),
            body: resolved(&pair(&self.institution_fr, &self.institution_en), language),
            image: non_blank(&self.photo),
            link: None,
        }
    }
}

// ==================== News ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub content_fr: Option<String>,
    #[serde(default)]
    pub content_en: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "date")]
    pub published_at: Option<String>,
}

impl Collection for NewsRecord {
    const PATH: &'static str = "news";
    const RESOURCE: &'static str = "news";
    const NAME: &'static str = "news";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Summarize for NewsRecord {
    fn summarize(&self, language: Language) -> ListItem {
        ListItem {
            id: self.id,
            heading: pair(&self.title_fr, &self.title_en)
                .resolve_or(language, "")
                .to_string(),
            subheading: non_blank(&self.published_at)
                .map(|d| d.chars().take(10).collect::<String>()),
            body: resolved(&pair(&self.content_fr, &self.content_en), language),
            image: non_blank(&self.image),
            link: None,
        }
    }
}

// ==================== Themes ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u64,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub description_fr: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
}

impl Collection for ThemeRecord {
    const PATH: &'static str = "themes";
    const RESOURCE: &'static str = "themes";
    const NAME: &'static str = "themes";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Summarize for ThemeRecord {
    fn summarize(&self, language: Language) -> ListItem {
        ListItem {
            id: self.id,
            heading: pair(&self.title_fr, &self.title_en)
                .resolve_or(language, "")
                .to_string(),
            subheading: None,
            body: resolved(&pair(&self.description_fr, &self.description_en), language),
            image: None,
            link: None,
        }
    }
}
