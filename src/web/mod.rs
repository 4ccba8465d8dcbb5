//! HTTP surface: public pages, the programme export and the admin console.

pub mod admin;
pub mod public;
pub mod templates;

use crate::auth::AuthContext;
use crate::backend::ApiClient;
use crate::config::Config;
use crate::forms::{ArchiveForm, FormSubmitter, PartnerForm, SessionForm};
use crate::i18n::Language;
use crate::metrics::SiteMetrics;
use anyhow::Result;
use askama::Template;
use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use templates::{ErrorTemplate, Layout};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: ApiClient,
    pub auth: AuthContext,
    pub submitter: FormSubmitter,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            auth: AuthContext::new(client.clone()),
            submitter: FormSubmitter::new(client.clone()),
            client,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/admin", get(admin::dashboard))
        .merge(admin::entity_routes::<ArchiveForm>())
        .merge(admin::entity_routes::<PartnerForm>())
        .merge(admin::entity_routes::<SessionForm>())
        .route_layer(from_fn_with_state(state.clone(), admin::require_admin));

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(health_handler))
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/:lang/programme", get(public::programme))
        .route("/:lang/programme/export", get(public::export))
        .route("/:lang/programme/:date", get(public::daily))
        .route("/:lang/:collection", get(public::collection))
        .merge(protected)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "metrics": SiteMetrics::global().report(),
    }))
}

async fn not_found() -> Response {
    let language = Language::canonical();
    error_page(
        StatusCode::NOT_FOUND,
        language,
        language.strings().not_found,
        &format!("/{}/programme", language.code()),
    )
}

// ==================== Rendering ====================

pub(crate) fn render<T: Template>(template: T) -> Response {
    render_with_status(StatusCode::OK, template)
}

pub(crate) fn render_with_status<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

pub(crate) fn error_page(status: StatusCode, language: Language, message: &str, back_href: &str) -> Response {
    render_with_status(
        status,
        ErrorTemplate {
            layout: Layout::public(language, message, "programme"),
            message: message.to_string(),
            back_href: back_href.to_string(),
        },
    )
}
