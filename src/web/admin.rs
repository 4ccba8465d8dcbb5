//! Admin console: login, dashboard and CRUD pages for programme sessions,
//! archives and partners.

use super::templates::{
    DashboardCount, DashboardTemplate, FormTemplate, Layout, ListRow, ListTemplate, LoginTemplate,
};
use super::{render, render_with_status, AppState};
use crate::auth::AuthError;
use crate::backend::{
    ArchiveRecord, Collection, CommitteeMemberRecord, Credentials, FileUpload, NewsRecord,
    PartnerRecord, SessionRecord, SpeakerRecord,
};
use crate::forms::{EntityForm, FieldErrors, SubmitOutcome};
use crate::i18n::Language;
use crate::security::{admin_session_cookie, clear_admin_session_cookie, cookie_value, ADMIN_COOKIE};
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

fn admin_language(state: &AppState) -> Language {
    state.config.default_language
}

/// Rejects requests whose admin cookie does not match the live session.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorized = match cookie_value(request.headers(), ADMIN_COOKIE) {
        Some(token) => state.auth.verify(&token).await,
        None => false,
    };

    if authorized {
        next.run(request).await
    } else {
        Redirect::to("/admin/login").into_response()
    }
}

// ==================== Session ====================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(State(state): State<AppState>) -> Response {
    let language = admin_language(&state);
    render(LoginTemplate {
        layout: Layout::admin(language, language.strings().login_heading),
        email: String::new(),
        error: None,
    })
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let language = admin_language(&state);
    let credentials = Credentials {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    match state.auth.login(credentials.clone()).await {
        Ok(token) => (
            [(header::SET_COOKIE, admin_session_cookie(&token))],
            Redirect::to("/admin"),
        )
            .into_response(),
        Err(e) => {
            let status = match e {
                AuthError::MissingCredentials => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Backend(_) => StatusCode::BAD_GATEWAY,
            };
            render_with_status(
                status,
                LoginTemplate {
                    layout: Layout::admin(language, language.strings().login_heading),
                    email: credentials.email,
                    error: Some(e.user_message(language).to_string()),
                },
            )
        }
    }
}

pub async fn logout(State(state): State<AppState>) -> Response {
    state.auth.logout().await;
    (
        [(header::SET_COOKIE, clear_admin_session_cookie())],
        Redirect::to("/admin/login"),
    )
        .into_response()
}

// ==================== Dashboard ====================

fn count<T>(result: Result<Vec<T>, crate::backend::ApiError>, what: &str) -> Option<usize> {
    match result {
        Ok(items) => Some(items.len()),
        Err(e) => {
            warn!("Dashboard count for {} unavailable: {}", what, e);
            None
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub async fn dashboard(State(state): State<AppState>) -> Response {
    let language = admin_language(&state);
    let strings = language.strings();
    let client = &state.client;

    let (archives, news, partners, speakers, committee, sessions, registrations) = futures::join!(
        client.fetch_collection::<ArchiveRecord>(language),
        client.fetch_collection::<NewsRecord>(language),
        client.fetch_collection::<PartnerRecord>(language),
        client.fetch_collection::<SpeakerRecord>(language),
        client.fetch_collection::<CommitteeMemberRecord>(language),
        client.fetch_collection::<SessionRecord>(language),
        client.registration_statistics(),
    );

    let entry = |label: &str, href: Option<&str>, value: Option<usize>| DashboardCount {
        label: label.to_string(),
        href: href.map(str::to_string),
        value,
    };
    let counts = vec![
        entry(strings.nav_programme, Some("/admin/programme"), count(sessions, "sessions")),
        entry(strings.nav_archives, Some("/admin/archives"), count(archives, "archives")),
        entry(strings.nav_partners, Some("/admin/partners"), count(partners, "partners")),
        entry(strings.nav_news, None, count(news, "news")),
        entry(strings.nav_speakers, None, count(speakers, "speakers")),
        entry(strings.nav_committee, None, count(committee, "committee")),
    ];

    let registrations = match registrations {
        Ok(map) => Some(
            map.iter()
                .map(|(name, value)| (name.clone(), display_value(value)))
                .collect(),
        ),
        Err(e) => {
            warn!("Registration statistics unavailable: {}", e);
            None
        }
    };

    let user = state
        .auth
        .current_user()
        .await
        .and_then(|user| user.name.or(user.email));

    render(DashboardTemplate {
        layout: Layout::admin(language, strings.dashboard_heading),
        user,
        counts,
        registrations,
    })
}

// ==================== Entity Pages ====================

/// List, create, edit and delete routes for one entity form.
pub fn entity_routes<F: EntityForm>() -> Router<AppState> {
    let base = format!("/admin/{}", F::ADMIN_PATH);
    Router::new()
        .route(&base, get(list::<F>).post(create::<F>))
        .route(&format!("{}/new", base), get(new_form::<F>))
        .route(&format!("{}/:id/edit", base), get(edit_form::<F>))
        .route(&format!("{}/:id", base), post(update::<F>))
        .route(&format!("{}/:id/delete", base), post(delete::<F>))
}

fn base_href<F: EntityForm>() -> String {
    format!("/admin/{}", F::ADMIN_PATH)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub error: Option<String>,
}

pub async fn list<F: EntityForm>(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let language = admin_language(&state);
    let strings = language.strings();
    let mut page = ListTemplate {
        layout: Layout::admin(language, F::heading(language)),
        base_href: base_href::<F>(),
        columns: F::list_columns(language),
        rows: Vec::new(),
        error: query.error.map(|_| strings.delete_failed.to_string()),
    };

    match state.client.fetch_collection::<F::Record>(language).await {
        Ok(records) => {
            page.rows = records
                .iter()
                .map(|record| ListRow {
                    id: record.id(),
                    cells: F::list_row(record, language),
                })
                .collect();
            render(page)
        }
        Err(e) => {
            warn!("Admin list of {} unavailable: {}", F::ADMIN_PATH, e);
            page.error = Some(strings.load_failed.to_string());
            render_with_status(StatusCode::BAD_GATEWAY, page)
        }
    }
}

fn form_page<F: EntityForm>(
    status: StatusCode,
    language: Language,
    form: &F,
    errors: &FieldErrors,
    message: Option<&str>,
) -> Response {
    let action = match form.record_id() {
        Some(id) => format!("{}/{}", base_href::<F>(), id),
        None => base_href::<F>(),
    };
    render_with_status(
        status,
        FormTemplate {
            layout: Layout::admin(language, F::heading(language)),
            action,
            cancel_href: base_href::<F>(),
            fields: form.fields(language, errors),
            message: message.map(str::to_string),
        },
    )
}

pub async fn new_form<F: EntityForm>(State(state): State<AppState>) -> Response {
    let language = admin_language(&state);
    form_page(StatusCode::OK, language, &F::default(), &FieldErrors::new(), None)
}

pub async fn edit_form<F: EntityForm>(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let language = admin_language(&state);
    match state.client.fetch_one::<F::Record>(id, language).await {
        Ok(record) => form_page(StatusCode::OK, language, &F::from_record(&record), &FieldErrors::new(), None),
        Err(e) => {
            warn!("Cannot edit {} {}: {}", F::ADMIN_PATH, id, e);
            let status = match e.status() {
                Some(404) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };
            form_page(status, language, &F::default().with_id(id), &FieldErrors::new(), Some(language.strings().load_failed))
        }
    }
}

/// Split a multipart body into text fields and the first non-empty file.
async fn read_multipart(mut multipart: Multipart) -> Result<(HashMap<String, String>, Option<FileUpload>), Response> {
    let mut fields = HashMap::new();
    let mut file = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err((StatusCode::BAD_REQUEST, e.body_text()).into_response()),
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err((StatusCode::BAD_REQUEST, e.body_text()).into_response()),
        };

        match file_name {
            Some(file_name) => {
                if file.is_none() && !bytes.is_empty() && !file_name.is_empty() {
                    file = Some(FileUpload {
                        field: name,
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            None => {
                fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok((fields, file))
}

async fn save<F: EntityForm>(state: &AppState, form: F) -> Response {
    let language = admin_language(state);
    let strings = language.strings();
    let token = state.auth.current_token().await;

    let outcome = state
        .submitter
        .submit(&form, token.as_deref(), language, |_| {
            info!("Saved {} {:?}", F::ADMIN_PATH, form.record_id());
        })
        .await;

    match outcome {
        SubmitOutcome::Saved(_) => Redirect::to(&base_href::<F>()).into_response(),
        SubmitOutcome::Invalid(errors) => form_page(
            StatusCode::UNPROCESSABLE_ENTITY,
            language,
            &form,
            &errors,
            Some(strings.form_invalid),
        ),
        SubmitOutcome::Failed { message } => form_page(
            StatusCode::BAD_GATEWAY,
            language,
            &form,
            &FieldErrors::new(),
            Some(&message),
        ),
        SubmitOutcome::Busy => form_page(
            StatusCode::CONFLICT,
            language,
            &form,
            &FieldErrors::new(),
            Some(strings.form_busy),
        ),
    }
}

pub async fn create<F: EntityForm>(State(state): State<AppState>, multipart: Multipart) -> Response {
    match read_multipart(multipart).await {
        Ok((fields, file)) => save(&state, F::from_fields(&fields, file)).await,
        Err(response) => response,
    }
}

pub async fn update<F: EntityForm>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Response {
    match read_multipart(multipart).await {
        Ok((fields, file)) => save(&state, F::from_fields(&fields, file).with_id(id)).await,
        Err(response) => response,
    }
}

pub async fn delete<F: EntityForm>(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let language = admin_language(&state);
    let token = state.auth.current_token().await;

    match state.submitter.delete::<F>(id, token.as_deref(), language).await {
        SubmitOutcome::Saved(_) => Redirect::to(&base_href::<F>()).into_response(),
        _ => Redirect::to(&format!("{}?error=delete", base_href::<F>())).into_response(),
    }
}
