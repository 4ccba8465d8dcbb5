//! Public pages, one language prefix per page.

use super::templates::{CollectionTemplate, DailyTemplate, Layout, ProgrammeTemplate};
use super::{error_page, render, render_with_status, AppState};
use crate::backend::{
    ArchiveRecord, Collection, CommitteeMemberRecord, NewsRecord, PartnerRecord, SessionRecord,
    SpeakerRecord, Summarize, ThemeRecord,
};
use crate::export::{export_programme, ExportError, ExportOptions};
use crate::i18n::Language;
use crate::loader::{LoadState, RemoteCollection};
use crate::schedule::{parse_day, ProgramView};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: Option<String>,
}

impl DayQuery {
    /// Day index from `?day=`; anything that is not a non-negative integer means the first day.
    pub fn index(&self) -> usize {
        self.day
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }
}

fn unknown_language() -> Response {
    let language = Language::canonical();
    error_page(
        StatusCode::NOT_FOUND,
        language,
        language.strings().not_found,
        &format!("/{}/programme", language.code()),
    )
}

pub async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("/{}/programme", state.config.default_language.code()))
}

// ==================== Programme ====================

pub async fn programme(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    Query(query): Query<DayQuery>,
) -> Response {
    let Ok(language) = Language::from_code(&lang) else {
        return unknown_language();
    };
    let strings = language.strings();
    let code = language.code();

    let mut page = ProgrammeTemplate {
        layout: Layout::public(language, strings.programme_heading, "programme"),
        tabs: Vec::new(),
        day_title: None,
        day_anchor: String::new(),
        cards: Vec::new(),
        export_href: format!("/{}/programme/export", code),
        error: None,
        retry_href: format!("/{}/programme", code),
    };

    let loader = RemoteCollection::<SessionRecord>::new(state.client.clone(), language);
    match loader.load().await {
        LoadState::Ready(records) => {
            let mut view = ProgramView::from_records(&records, language);
            view.select_day_or_first(query.index());
            page.tabs = view.tabs();
            page.day_title = view.day_title(view.active_day());
            page.day_anchor = ProgramView::anchor_id(view.active_day());
            page.cards = view.cards().to_vec();
            render(page)
        }
        other => {
            page.error = Some(other.error_message().unwrap_or(strings.load_failed).to_string());
            render_with_status(StatusCode::BAD_GATEWAY, page)
        }
    }
}

/// The whole programme as a PDF attachment.
pub async fn export(State(state): State<AppState>, Path(lang): Path<String>) -> Response {
    let Ok(language) = Language::from_code(&lang) else {
        return unknown_language();
    };
    let strings = language.strings();
    let back = format!("/{}/programme", language.code());

    let records = match state.client.fetch_collection::<SessionRecord>(language).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Programme export aborted, sessions unavailable: {}", e);
            return error_page(StatusCode::BAD_GATEWAY, language, strings.load_failed, &back);
        }
    };

    let mut view = ProgramView::from_records(&records, language);
    let options = ExportOptions::from_config(&state.config, language, chrono::Local::now().date_naive());

    match export_programme(&mut view, options).await {
        Ok(exported) => {
            info!(
                "Serving {} ({} bytes, {} day(s) skipped)",
                exported.filename,
                exported.bytes.len(),
                exported.skipped_days.len()
            );
            let disposition = format!("attachment; filename=\"{}\"", exported.filename);
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                exported.bytes,
            )
                .into_response()
        }
        Err(e) => {
            let status = match e {
                ExportError::NoDays => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_page(status, language, e.user_message(language), &back)
        }
    }
}

/// Sessions of one date, as listed by the backend.
pub async fn daily(
    State(state): State<AppState>,
    Path((lang, date)): Path<(String, String)>,
) -> Response {
    let Ok(language) = Language::from_code(&lang) else {
        return unknown_language();
    };
    let strings = language.strings();
    let back = format!("/{}/programme", language.code());

    let Some(date) = parse_day(&date) else {
        return error_page(StatusCode::BAD_REQUEST, language, strings.field_invalid_date, &back);
    };

    let mut page = DailyTemplate {
        layout: Layout::public(
            language,
            strings.programme_heading,
            &format!("programme/{}", date.format("%Y-%m-%d")),
        ),
        date: strings.format_date(date),
        cards: Vec::new(),
        error: None,
        retry_href: format!("/{}/programme/{}", language.code(), date.format("%Y-%m-%d")),
    };

    match state.client.fetch_daily_programme(date, language).await {
        Ok(records) => {
            page.cards = ProgramView::from_records(&records, language).cards().to_vec();
            render(page)
        }
        Err(e) => {
            warn!("Failed to load programme for {}: {}", date, e);
            page.error = Some(strings.load_failed.to_string());
            render_with_status(StatusCode::BAD_GATEWAY, page)
        }
    }
}

// ==================== Collections ====================

pub async fn collection(
    State(state): State<AppState>,
    Path((lang, section)): Path<(String, String)>,
) -> Response {
    let Ok(language) = Language::from_code(&lang) else {
        return unknown_language();
    };

    match section.as_str() {
        "news" => collection_page::<NewsRecord>(&state, language, &section).await,
        "archives" => collection_page::<ArchiveRecord>(&state, language, &section).await,
        "partners" => collection_page::<PartnerRecord>(&state, language, &section).await,
        "speakers" => collection_page::<SpeakerRecord>(&state, language, &section).await,
        "committee" => collection_page::<CommitteeMemberRecord>(&state, language, &section).await,
        "themes" => collection_page::<ThemeRecord>(&state, language, &section).await,
        _ => error_page(
            StatusCode::NOT_FOUND,
            language,
            language.strings().not_found,
            &format!("/{}/programme", language.code()),
        ),
    }
}

async fn collection_page<T>(state: &AppState, language: Language, section: &str) -> Response
where
    T: Collection + Summarize,
{
    let strings = language.strings();
    let title = super::templates::section_label(strings, section);
    let mut page = CollectionTemplate {
        layout: Layout::public(language, title, section),
        items: Vec::new(),
        error: None,
        retry_href: format!("/{}/{}", language.code(), section),
    };

    let loader = RemoteCollection::<T>::new(state.client.clone(), language);
    match loader.load().await {
        LoadState::Ready(records) => {
            page.items = records.iter().map(|r| r.summarize(language)).collect();
            render(page)
        }
        other => {
            page.error = Some(other.error_message().unwrap_or(strings.load_failed).to_string());
            render_with_status(StatusCode::BAD_GATEWAY, page)
        }
    }
}
