use crate::backend::ListItem;
use crate::forms::FormField;
use crate::i18n::{Language, LanguageStrings};
use crate::schedule::{DayTab, TimelineCard};
use askama::Template;

/// Shared page chrome.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub lang: &'static str,
    pub strings: &'static LanguageStrings,
    pub nav: Vec<NavLink>,
    /// Same page in the other languages
    pub switches: Vec<NavLink>,
    pub admin: bool,
}

#[derive(Debug, Clone)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    pub active: bool,
}

/// Collections listed in the public navigation, by path segment.
pub const PUBLIC_SECTIONS: [&str; 7] = [
    "programme",
    "news",
    "speakers",
    "themes",
    "partners",
    "committee",
    "archives",
];

pub fn section_label(strings: &LanguageStrings, section: &str) -> &'static str {
    match section {
        "programme" => strings.nav_programme,
        "news" => strings.nav_news,
        "speakers" => strings.nav_speakers,
        "themes" => strings.nav_themes,
        "partners" => strings.nav_partners,
        "committee" => strings.nav_committee,
        "archives" => strings.nav_archives,
        _ => strings.not_found,
    }
}

impl Layout {
    /// Public page in `language`; `path` is the part after the language prefix.
    pub fn public(language: Language, title: &str, path: &str) -> Self {
        let strings = language.strings();
        let current = path.split('/').next().unwrap_or("");
        let nav = PUBLIC_SECTIONS
            .iter()
            .map(|section| NavLink {
                href: format!("/{}/{}", language.code(), section),
                label: section_label(strings, section).to_string(),
                active: *section == current,
            })
            .collect();
        let switches = language
            .alternates()
            .into_iter()
            .map(|other| NavLink {
                href: format!("/{}/{}", other.code(), path),
                label: other.native_name().to_string(),
                active: false,
            })
            .collect();

        Self {
            title: title.to_string(),
            lang: language.code(),
            strings,
            nav,
            switches,
            admin: false,
        }
    }

    pub fn admin(language: Language, title: &str) -> Self {
        let strings = language.strings();
        let nav = [
            ("/admin", strings.dashboard_heading),
            ("/admin/programme", strings.nav_programme),
            ("/admin/archives", strings.nav_archives),
            ("/admin/partners", strings.nav_partners),
        ]
        .iter()
        .map(|(href, label)| NavLink {
            href: href.to_string(),
            label: label.to_string(),
            active: *label == title,
        })
        .collect();

        Self {
            title: title.to_string(),
            lang: language.code(),
            strings,
            nav,
            switches: Vec::new(),
            admin: true,
        }
    }
}

// ==================== Public Pages ====================

#[derive(Template)]
#[template(path = "public/programme.html")]
pub struct ProgrammeTemplate {
    pub layout: Layout,
    pub tabs: Vec<DayTab>,
    pub day_title: Option<String>,
    pub day_anchor: String,
    pub cards: Vec<TimelineCard>,
    pub export_href: String,
    pub error: Option<String>,
    pub retry_href: String,
}

#[derive(Template)]
#[template(path = "public/daily.html")]
pub struct DailyTemplate {
    pub layout: Layout,
    pub date: String,
    pub cards: Vec<TimelineCard>,
    pub error: Option<String>,
    pub retry_href: String,
}

#[derive(Template)]
#[template(path = "public/collection.html")]
pub struct CollectionTemplate {
    pub layout: Layout,
    pub items: Vec<ListItem>,
    pub error: Option<String>,
    pub retry_href: String,
}

#[derive(Template)]
#[template(path = "public/error.html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub message: String,
    pub back_href: String,
}

// ==================== Admin Pages ====================

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

/// A dashboard counter; `None` when the count could not be fetched.
#[derive(Debug, Clone)]
pub struct DashboardCount {
    pub label: String,
    pub href: Option<String>,
    pub value: Option<usize>,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub user: Option<String>,
    pub counts: Vec<DashboardCount>,
    pub registrations: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone)]
pub struct ListRow {
    pub id: u64,
    pub cells: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/list.html")]
pub struct ListTemplate {
    pub layout: Layout,
    pub base_href: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<ListRow>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/form.html")]
pub struct FormTemplate {
    pub layout: Layout,
    pub action: String,
    pub cancel_href: String,
    pub fields: Vec<FormField>,
    pub message: Option<String>,
}
